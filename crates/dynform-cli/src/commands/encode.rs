//! The `encode` command.
//!
//! Prints a file as the `data:` URL a file or photo control would hold
//! after reading it.

use async_trait::async_trait;
use dynform_core::{FormError, Settings};
use dynform_forms::upload::read_as_data_url;

use crate::command::Command;

/// Encodes a file as a data URL.
pub struct EncodeCommand;

#[async_trait]
impl Command for EncodeCommand {
    fn name(&self) -> &'static str {
        "encode"
    }

    fn help(&self) -> &'static str {
        "Print a file as a data URL"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("file")
                .required(true)
                .help("Path to the file to encode"),
        )
        .arg(
            clap::Arg::new("max-size")
                .long("max-size")
                .value_parser(clap::value_parser!(usize))
                .help("Size limit in bytes (defaults to the max_upload_size setting)"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), FormError> {
        let path = matches
            .get_one::<String>("file")
            .ok_or_else(|| FormError::Configuration("No file given".to_string()))?;
        let max_size = matches
            .get_one::<usize>("max-size")
            .copied()
            .unwrap_or(settings.max_upload_size);

        let data_url = read_as_data_url(path, max_size).await?;
        println!("{data_url}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn matches_for(args: &[&str]) -> clap::ArgMatches {
        EncodeCommand
            .add_arguments(clap::Command::new("encode"))
            .try_get_matches_from(args)
            .unwrap()
    }

    #[tokio::test]
    async fn test_encode_small_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        let matches = matches_for(&["encode", file.path().to_str().unwrap()]);
        assert!(EncodeCommand.handle(&matches, &Settings::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_encode_respects_max_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abcdef").unwrap();
        let matches = matches_for(&["encode", file.path().to_str().unwrap(), "--max-size", "2"]);
        let err = EncodeCommand
            .handle(&matches, &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::Upload(_)));
    }
}
