// crates/repbridge-cli/src/commands/keys.rs
//
// `repbridge keygen`: admin key management, and loading the key that signs
// admin requests.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use repbridge_core::identity::parse_hex32;
use repbridge_core::Keypair;

const SECRET_FILE: &str = "admin.secret";
const PUBLIC_FILE: &str = "admin.pub";

/// Generate an admin keypair.
#[derive(Debug, Args)]
pub struct KeygenCmd {
    /// Directory to write the key files into (default: ~/.repbridge/keys).
    #[arg(long)]
    pub dir: Option<String>,

    /// Overwrite existing key files.
    #[arg(long)]
    pub force: bool,
}

/// Selects the secret key file that signs an admin request.
#[derive(Debug, Clone, Args)]
pub struct KeyArgs {
    /// Path to the hex-encoded admin secret (default: ~/.repbridge/keys/admin.secret).
    #[arg(long)]
    pub key: Option<String>,
}

/// Run the keygen command.
pub async fn run_keygen(cmd: &KeygenCmd) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match &cmd.dir {
        Some(d) => PathBuf::from(expand_tilde(d)),
        None => default_keys_dir()?,
    };
    let secret_path = dir.join(SECRET_FILE);
    if secret_path.exists() && !cmd.force {
        return Err(format!(
            "{} already exists; pass --force to overwrite",
            secret_path.display()
        )
        .into());
    }

    let keypair = Keypair::generate();
    let pub_path = write_keypair(&dir, &keypair)?;

    println!("Admin keypair created.");
    println!("  Public key (admin): {}", keypair.account_id());
    println!("  Saved to: {}", pub_path.display());
    println!();
    println!("IMPORTANT: Back up your secret key file securely.");
    println!("  Secret key: {}", secret_path.display());

    Ok(())
}

/// Write the keypair's secret and public key as hex files under `dir`.
/// Returns the public key path.
pub fn write_keypair(dir: &Path, keypair: &Keypair) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(SECRET_FILE), hex::encode(keypair.signing_key.to_bytes()))?;
    let pub_path = dir.join(PUBLIC_FILE);
    fs::write(&pub_path, keypair.account_id().to_string())?;
    Ok(pub_path)
}

/// Load the signing keypair selected by `args`.
pub fn load_keypair(args: &KeyArgs) -> Result<Keypair, Box<dyn std::error::Error>> {
    let path = match &args.key {
        Some(p) => PathBuf::from(expand_tilde(p)),
        None => default_keys_dir()?.join(SECRET_FILE),
    };
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("Could not read admin key {}: {}", path.display(), e))?;
    let secret = parse_hex32(&contents)?;
    Ok(Keypair::from_secret(&secret))
}

fn default_keys_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let home = dirs::home_dir().ok_or("Could not determine home directory")?;
    Ok(home.join(".repbridge").join("keys"))
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_keypair_loads_back() {
        let dir = std::env::temp_dir().join(format!(
            "repbridge_cli_keys_{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let keypair = Keypair::generate();
        write_keypair(&dir, &keypair).unwrap();

        let loaded = load_keypair(&KeyArgs {
            key: Some(dir.join(SECRET_FILE).to_string_lossy().to_string()),
        })
        .unwrap();
        assert_eq!(loaded.account_id(), keypair.account_id());

        let public = fs::read_to_string(dir.join(PUBLIC_FILE)).unwrap();
        assert_eq!(public, keypair.account_id().to_string());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = load_keypair(&KeyArgs {
            key: Some("/nonexistent/admin.secret".to_string()),
        })
        .unwrap_err();
        assert!(err.to_string().contains("Could not read admin key"));
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/tmp/keys"), "/tmp/keys");
    }
}
