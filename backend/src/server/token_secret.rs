//! Loading the token signing secret at startup.

use std::path::Path;

use qa_backend::domain::{TokenSecret, TokenSecretError};
use tracing::{info, warn};

use super::config::{BuildMode, ServerConfigError};

/// Read the signing secret from `path`.
///
/// When the file cannot be read, debug builds and runs with
/// `allow_ephemeral` fall back to a generated secret; tokens then stop
/// verifying after a restart. A file that is present but too short is always
/// an error.
pub fn load_token_secret(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<TokenSecret, ServerConfigError> {
    let secret = match std::fs::read(path) {
        Ok(bytes) => TokenSecret::new(bytes).map_err(|err| match err {
            TokenSecretError::TooShort { length, min_len } => ServerConfigError::SecretTooShort {
                path: path.to_path_buf(),
                length,
                min_len,
            },
        })?,
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary token secret (dev only)"
            );
            TokenSecret::generate()
        }
        Err(source) => {
            return Err(ServerConfigError::SecretRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    info!(fingerprint = %secret.fingerprint(), "token secret loaded");
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use rstest::{fixture, rstest};
    use tempfile::{NamedTempFile, TempDir};

    fn secret_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents).expect("write secret");
        file
    }

    #[fixture]
    fn empty_dir() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[rstest]
    fn reads_secret_from_file() {
        let file = secret_file(&[b'a'; 48]);
        let expected = TokenSecret::new(vec![b'a'; 48]).expect("secret").fingerprint();

        let secret = load_token_secret(file.path(), BuildMode::Release, false).expect("loads");
        assert_eq!(secret.fingerprint(), expected);
    }

    #[rstest]
    #[case(BuildMode::Debug, false)]
    #[case(BuildMode::Release, true)]
    #[case(BuildMode::Release, false)]
    fn short_file_is_rejected(#[case] mode: BuildMode, #[case] allow_ephemeral: bool) {
        let file = secret_file(b"too-short");

        let err = load_token_secret(file.path(), mode, allow_ephemeral).expect_err("too short");
        assert!(matches!(
            err,
            ServerConfigError::SecretTooShort { length: 9, .. }
        ));
    }

    #[rstest]
    #[case(BuildMode::Debug, false)]
    #[case(BuildMode::Release, true)]
    fn missing_file_falls_back_when_allowed(
        empty_dir: TempDir,
        #[case] mode: BuildMode,
        #[case] allow_ephemeral: bool,
    ) {
        let path = empty_dir.path().join("token_secret");
        let first = load_token_secret(&path, mode, allow_ephemeral).expect("generated");
        let second = load_token_secret(&path, mode, allow_ephemeral).expect("generated");
        assert_ne!(first.fingerprint(), second.fingerprint());
    }

    #[rstest]
    fn missing_file_is_fatal_in_release(empty_dir: TempDir) {
        let path = empty_dir.path().join("token_secret");
        let err = load_token_secret(&path, BuildMode::Release, false).expect_err("no fallback");
        assert!(matches!(err, ServerConfigError::SecretRead { .. }));
    }
}
