use clap::{Parser, Subcommand};

/// notebridge: release notes translation relay between CI and a Telegram reviewer
#[derive(Parser)]
#[command(name = "notebridge", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server and the Telegram update poller
    Serve {
        /// Port to bind
        #[arg(short, long, env = "NOTEBRIDGE_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Translate a text once and print the result (checks DeepL credentials)
    Translate {
        /// Target language code, e.g. "de"
        #[arg(long)]
        to: String,
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["notebridge"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_port() {
        let cli = Cli::try_parse_from(["notebridge", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, 9000),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_translate_args() {
        let cli =
            Cli::try_parse_from(["notebridge", "translate", "--to", "de", "Fix bug"]).unwrap();
        match cli.command {
            Some(Commands::Translate { to, text }) => {
                assert_eq!(to, "de");
                assert_eq!(text, "Fix bug");
            }
            _ => panic!("expected translate"),
        }
    }
}
