use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, info};

use sekey::adapters::SoftElementFinder;
use sekey::keys::{LocalInfo, LocalKey, SecureElementInfo, SecureElementKeyRecord};
use sekey::model::RomId;
use sekey::{DeviceDiscovery, KeyCodec, KeyRecord, Keyring, PrivateKey, SecureElementKey};

/// ROM id reported by the virtual element
const VIRTUAL_ROM_ID: &[u8] = b"sekey-virtual";

#[derive(Parser, Debug)]
#[command(name = "sekey")]
#[command(about = "Secure element backed secp256r1 keys", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Keyring file
    #[arg(long, env = "SEKEY_KEYRING", default_value = "sekey-keyring.json")]
    pub keyring: PathBuf,

    /// Use a virtual secure element whose key is derived from this hex seed
    #[arg(long, env = "SEKEY_VIRTUAL_SEED")]
    pub virtual_seed: Option<String>,

    /// PIV slot holding the key (9a, 9c, 9d, 9e or the slot name)
    #[cfg(feature = "yubikey")]
    #[arg(long, default_value = "9c")]
    pub slot: sekey::model::Slot,

    /// PIN verified before signing
    #[cfg(feature = "yubikey")]
    #[arg(long, env = "SEKEY_PIN")]
    pub pin: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a key to the keyring and print its public key
    Add {
        name: String,

        /// Generate a software key instead of binding the secure element
        #[arg(long)]
        local: bool,
    },

    /// List keyring entries
    List,

    /// Show an entry's type and public key
    Show { name: String },

    /// Sign data provided via stdin, printing the signature as hex
    Sign { name: String },

    /// Check the device still holds the stored key
    Validate { name: String },

    /// Remove an entry from the keyring
    Remove { name: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_writer(io::stderr)
        .init();

    let discovery = build_discovery(&cli)?;
    let mut keyring = Keyring::open(&cli.keyring)
        .with_context(|| format!("failed to open keyring {}", cli.keyring.display()))?;

    match cli.command {
        Commands::Add { name, local } => {
            let record: KeyRecord = if local {
                let key = LocalKey::generate();
                LocalInfo {
                    name: name.clone(),
                    public_key: key.public_key(),
                    private_key: keyring.codec().encode(&key.to_record().into())?,
                }
                .into()
            } else {
                let key = SecureElementKey::discover(&discovery)
                    .context("failed to bind secure element")?;
                SecureElementInfo {
                    name: name.clone(),
                    public_key: *key.public_key(),
                }
                .into()
            };

            keyring.add(&name, &record)?;
            keyring.save().context("failed to save keyring")?;
            println!("{}", record.public_key().to_hex());
        }

        Commands::List => {
            for name in keyring.names() {
                let tagged = keyring.get_tagged(name)?;
                println!("{}\t{}", name, tagged.type_tag);
            }
        }

        Commands::Show { name } => {
            let record = keyring.get(&name)?;
            println!("type: {}", record.tag());
            println!("public_key: {}", record.public_key());
        }

        Commands::Sign { name } => {
            let key = load_signer(&keyring, &discovery, &name)?;

            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            debug!("Signing {} bytes with {}", data.len(), name);

            let signature = key
                .sign(&data)
                .with_context(|| format!("failed to sign with {}", name))?;
            println!("{}", hex::encode(signature));
        }

        Commands::Validate { name } => {
            let key = load_signer(&keyring, &discovery, &name)?;
            key.validate_key()
                .with_context(|| format!("key {} failed validation", name))?;
            println!("ok");
        }

        Commands::Remove { name } => {
            keyring.remove(&name)?;
            keyring.save().context("failed to save keyring")?;
            info!("Removed {}", name);
        }
    }

    Ok(())
}

fn build_discovery(cli: &Cli) -> anyhow::Result<DeviceDiscovery> {
    if let Some(seed_hex) = &cli.virtual_seed {
        let seed = hex::decode(seed_hex).context("virtual seed is not valid hex")?;
        let rom_id = RomId::new(VIRTUAL_ROM_ID.to_vec())?;
        debug!("Using virtual secure element");
        return Ok(DeviceDiscovery::with_finder(SoftElementFinder::new(
            seed, rom_id,
        )));
    }

    hardware_discovery(cli)
}

#[cfg(feature = "yubikey")]
fn hardware_discovery(cli: &Cli) -> anyhow::Result<DeviceDiscovery> {
    use sekey::adapters::{PivConfig, PivDeviceFinder};
    use sekey::model::Pin;

    let pin = cli
        .pin
        .as_deref()
        .map(str::parse::<Pin>)
        .transpose()
        .context("invalid PIN")?;
    let config = PivConfig {
        slot: cli.slot,
        pin,
    };
    Ok(DeviceDiscovery::with_finder(PivDeviceFinder { config }))
}

/// Without a hardware driver only the virtual element can be discovered
#[cfg(not(feature = "yubikey"))]
fn hardware_discovery(_cli: &Cli) -> anyhow::Result<DeviceDiscovery> {
    Ok(DeviceDiscovery::new())
}

/// Rebuild a signing key from a keyring entry
fn load_signer(
    keyring: &Keyring,
    discovery: &DeviceDiscovery,
    name: &str,
) -> anyhow::Result<Box<dyn PrivateKey>> {
    let record = keyring.get(name)?;
    let key: Box<dyn PrivateKey> = match record {
        KeyRecord::SecureElementInfo(info) => {
            let record = SecureElementKeyRecord {
                public_key: info.public_key,
            };
            Box::new(
                SecureElementKey::restore(&record, discovery)
                    .with_context(|| format!("failed to restore {}", name))?,
            )
        }
        KeyRecord::LocalInfo(info) => Box::new(local_key(keyring.codec(), &info)?),
        other => bail!("{} entries cannot sign", other.tag()),
    };
    Ok(key)
}

fn local_key(codec: &KeyCodec, info: &LocalInfo) -> anyhow::Result<LocalKey> {
    match codec.decode(&info.private_key)? {
        KeyRecord::LocalKey(record) => {
            let key = LocalKey::from_record(&record);
            if key.public_key() != info.public_key {
                bail!("stored private key does not match {}", info.name);
            }
            Ok(key)
        }
        other => bail!("{} holds a {} record", info.name, other.tag()),
    }
}
