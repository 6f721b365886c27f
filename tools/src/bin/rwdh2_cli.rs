use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rwdh2::backend::serial::BAUD;
use rwdh2::protocol::layout::AUTH_SLOTS;
use rwdh2::{AckStatus, Config, Rwdh2, SerialTransport, StdDelay};

#[derive(Parser, Debug)]
#[command(about = "Talk to an RWD Hitag2 reader on a serial port")]
struct Args {
    /// Serial port, e.g. /dev/ttyUSB0
    #[arg(short, long)]
    port: String,

    #[arg(short, long, default_value_t = BAUD)]
    baud: u32,

    /// Ready/response timeout in ms, 0 waits forever
    #[arg(short, long, default_value_t = 1000)]
    timeout: u32,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Show the reader status bits
    Status,
    /// Print the UID of the tag in the field
    Uid,
    /// Print the reader identifier string
    Identify,
    /// Dump the 16 bytes of user data (tag pages 4-7)
    ReadUser,
    /// Write 16 bytes of user data, given as 32 hex digits
    WriteUser { data: String },
    /// Store a tag UID (8 hex digits) in an authorisation slot
    Authorize { slot: u8, uid: String },
    /// Clear all authorisation slots
    DeauthorizeAll,
    /// Blank the authorisation list so any tag's UID can be queried
    EnableUid,
    /// Set the reader password in EEPROM (8 hex digits)
    ReaderPassword { password: String },
    /// Set the tag password in EEPROM (6 hex digits)
    TagPassword { password: String },
}

fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(s).with_context(|| format!("invalid hex: {s}"))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow!("expected {N} bytes, got {}", b.len()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)?;

    let transport = SerialTransport::open(&args.port, args.baud)
        .with_context(|| format!("opening {}", args.port))?;
    let cts = transport.cts_pin()?;
    let config = Config::default().with_timeout_ms(args.timeout);
    let mut reader = Rwdh2::with_config(transport, cts, StdDelay, config);
    reader.begin(false)?;

    match args.command {
        Cmd::Status => {
            let result = reader.get_status();
            let status = AckStatus::from_bits_truncate(reader.last_ack());
            println!("ack {:#04X}: {}", reader.last_ack(), status);
            result?;
        }
        Cmd::Uid => {
            let uid = reader.get_uid()?;
            println!("{}", hex::encode_upper(uid));
        }
        Cmd::Identify => {
            println!("{}", reader.identifier()?);
        }
        Cmd::ReadUser => {
            let mut data = [0u8; 16];
            reader.read_user_data(&mut data)?;
            println!("{}", hex::encode_upper(data));
        }
        Cmd::WriteUser { data } => {
            reader.write_user_data(&parse_hex::<16>(&data)?)?;
        }
        Cmd::Authorize { slot, uid } => {
            if slot >= AUTH_SLOTS {
                return Err(anyhow!("slot must be below {AUTH_SLOTS}"));
            }
            reader.authorize_tag(&parse_hex::<4>(&uid)?, slot)?;
        }
        Cmd::DeauthorizeAll => {
            let bar = ProgressBar::new(u64::from(AUTH_SLOTS)).with_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} slots")
                    .unwrap(),
            );
            reader.deauthorize_all_tags_with_progress(|_| bar.inc(1))?;
            bar.finish();
        }
        Cmd::EnableUid => {
            reader.enable_uid_query()?;
        }
        Cmd::ReaderPassword { password } => {
            reader.set_reader_password(&parse_hex::<4>(&password)?)?;
        }
        Cmd::TagPassword { password } => {
            reader.set_tag_password_in_eeprom(&parse_hex::<3>(&password)?)?;
        }
    }

    Ok(())
}
