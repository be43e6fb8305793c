use crate::output::Output;
use color_eyre::Result;
use media_status_config::{CredentialStore, PathManager};
use std::fs;

pub async fn run_clear(session: bool, credentials: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if session {
        clear_session(&path_manager, output)?;
    } else if credentials {
        clear_credentials(&path_manager, output)?;
    } else {
        output.warn("No clear option specified. Use --session or --credentials");
        output.println("\nExample: finwatch clear --session");
    }

    Ok(())
}

fn clear_session(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();
    if !credentials_file.exists() {
        output.info("No credentials file found, nothing to clear");
        return Ok(());
    }

    let mut cred_store = CredentialStore::new(credentials_file);
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;

    if !cred_store.has_session() {
        output.info("Not signed in, nothing to clear");
        return Ok(());
    }

    cred_store.clear_session();
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;
    output.success("Signed out (device id kept)");
    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e)
        })?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    fn quiet_output() -> Output {
        Output::new(OutputFormat::Human, true)
    }

    #[test]
    fn test_clear_session_keeps_device_id() {
        let dir = TempDir::new().unwrap();
        let paths = PathManager::with_base(dir.path().to_path_buf());

        let mut store = CredentialStore::new(paths.credentials_file());
        store.set_access_token("token".to_string());
        store.set_user_id("user".to_string());
        store.set_device_id("device".to_string());
        store.save().unwrap();

        clear_session(&paths, &quiet_output()).unwrap();

        let mut reloaded = CredentialStore::new(paths.credentials_file());
        reloaded.load().unwrap();
        assert!(!reloaded.has_session());
        assert_eq!(reloaded.get_device_id().map(String::as_str), Some("device"));
    }

    #[test]
    fn test_clear_credentials_removes_file() {
        let dir = TempDir::new().unwrap();
        let paths = PathManager::with_base(dir.path().to_path_buf());

        let mut store = CredentialStore::new(paths.credentials_file());
        store.set_access_token("token".to_string());
        store.save().unwrap();

        clear_credentials(&paths, &quiet_output()).unwrap();
        assert!(!paths.credentials_file().exists());

        // nothing left is not an error
        clear_credentials(&paths, &quiet_output()).unwrap();
        clear_session(&paths, &quiet_output()).unwrap();
    }
}
