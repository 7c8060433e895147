//! PostgreSQL key=value DSN parsing

use crate::error::{Error, Result};
use std::iter::Peekable;
use std::path::PathBuf;
use std::str::Chars;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::Config;
use tracing::debug;

/// How far a TLS session must be verified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVerify {
    /// Plain connection, no TLS at all
    Disabled,
    /// Encrypt, but accept any certificate (`allow`, `prefer`, `require`)
    Encrypt,
    /// Check the certificate chain but not the host name
    VerifyCa,
    /// Check the certificate chain and the host name
    VerifyFull,
}

/// A parsed DSN: the client config plus what TLS it asks for
#[derive(Debug, Clone)]
pub struct PgConnectOptions {
    pub config: Config,
    pub verify: TlsVerify,
    /// `sslrootcert`: extra PEM root certificate
    pub root_cert: Option<PathBuf>,
}

/// Parse a `host=... port=... dbname=...` DSN into connect options.
///
/// Values may be single-quoted. `search_path` is passed to the server as a
/// startup option; keys the client does not understand are skipped.
/// Without `sslmode` the connection is attempted with TLS and falls back to
/// plain text, as libpq's `prefer` does.
pub fn parse_config(dsn: &str) -> Result<PgConnectOptions> {
    let mut config = Config::new();
    let mut options: Vec<String> = Vec::new();
    let mut verify = TlsVerify::Encrypt;
    let mut root_cert = None;

    for (key, value) in tokenize(dsn)? {
        match key.as_str() {
            "host" => {
                config.host(&value);
            }
            "port" => {
                let port = value
                    .parse::<u16>()
                    .map_err(|_| Error::InvalidDsn(format!("invalid port {:?}", value)))?;
                config.port(port);
            }
            "user" => {
                config.user(&value);
            }
            "password" => {
                config.password(&value);
            }
            "dbname" => {
                config.dbname(&value);
            }
            "application_name" => {
                config.application_name(&value);
            }
            "connect_timeout" => {
                let secs = value.parse::<u64>().map_err(|_| {
                    Error::InvalidDsn(format!("invalid connect_timeout {:?}", value))
                })?;
                config.connect_timeout(Duration::from_secs(secs));
            }
            "sslmode" => {
                let (mode, level) = parse_ssl_mode(&value)?;
                config.ssl_mode(mode);
                verify = level;
            }
            "sslrootcert" => root_cert = Some(PathBuf::from(value)),
            "search_path" => options.push(format!("-c search_path={}", value)),
            "options" => options.push(value),
            other => debug!(option = other, "ignoring PostgreSQL DSN option"),
        }
    }

    if !options.is_empty() {
        config.options(&options.join(" "));
    }
    Ok(PgConnectOptions {
        config,
        verify,
        root_cert,
    })
}

fn parse_ssl_mode(value: &str) -> Result<(SslMode, TlsVerify)> {
    match value {
        "disable" => Ok((SslMode::Disable, TlsVerify::Disabled)),
        "allow" | "prefer" => Ok((SslMode::Prefer, TlsVerify::Encrypt)),
        "require" => Ok((SslMode::Require, TlsVerify::Encrypt)),
        "verify-ca" => Ok((SslMode::Require, TlsVerify::VerifyCa)),
        "verify-full" => Ok((SslMode::Require, TlsVerify::VerifyFull)),
        other => Err(Error::InvalidDsn(format!("invalid sslmode {:?}", other))),
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn tokenize(dsn: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut chars = dsn.chars().peekable();
    loop {
        skip_whitespace(&mut chars);
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        skip_whitespace(&mut chars);
        if chars.next() != Some('=') {
            return Err(Error::InvalidDsn(format!("expected '=' after {:?}", key)));
        }
        skip_whitespace(&mut chars);

        let mut value = String::new();
        if chars.next_if_eq(&'\'').is_some() {
            loop {
                match chars.next() {
                    Some('\\') => value.extend(chars.next()),
                    Some('\'') => break,
                    Some(c) => value.push(c),
                    None => {
                        return Err(Error::InvalidDsn(format!(
                            "unterminated quoted value for {:?}",
                            key
                        )))
                    }
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                if c == '\\' {
                    value.extend(chars.next());
                } else {
                    value.push(c);
                }
            }
        }
        pairs.push((key, value));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_postgres::config::Host;

    #[test]
    fn test_key_values() {
        let options = parse_config(
            "host=localhost port=5433 user=postgres password=secret dbname=test sslmode=disable",
        )
        .unwrap();
        assert_eq!(options.verify, TlsVerify::Disabled);
        let config = options.config;
        assert_eq!(config.get_hosts(), &[Host::Tcp("localhost".to_string())]);
        assert_eq!(config.get_ports(), &[5433]);
        assert_eq!(config.get_user(), Some("postgres"));
        assert_eq!(config.get_password(), Some(&b"secret"[..]));
        assert_eq!(config.get_dbname(), Some("test"));
        assert_eq!(config.get_ssl_mode(), SslMode::Disable);
    }

    #[test]
    fn test_search_path_becomes_option() {
        let options = parse_config("host=db dbname=test search_path=sales").unwrap();
        assert_eq!(options.config.get_options(), Some("-c search_path=sales"));
    }

    #[test]
    fn test_ssl_modes() {
        let options = parse_config("host=db").unwrap();
        assert_eq!(options.config.get_ssl_mode(), SslMode::Prefer);
        assert_eq!(options.verify, TlsVerify::Encrypt);

        let options = parse_config("host=db sslmode=require").unwrap();
        assert_eq!(options.config.get_ssl_mode(), SslMode::Require);
        assert_eq!(options.verify, TlsVerify::Encrypt);

        let options = parse_config("host=db sslmode=verify-ca sslrootcert=/etc/ca.pem").unwrap();
        assert_eq!(options.verify, TlsVerify::VerifyCa);
        assert_eq!(options.root_cert, Some(PathBuf::from("/etc/ca.pem")));

        let options = parse_config("host=db sslmode=verify-full").unwrap();
        assert_eq!(options.config.get_ssl_mode(), SslMode::Require);
        assert_eq!(options.verify, TlsVerify::VerifyFull);
    }

    #[test]
    fn test_quoted_values() {
        let pairs = tokenize(r"password='it\'s' user = 'a b'").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("password".to_string(), "it's".to_string()),
                ("user".to_string(), "a b".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid() {
        assert!(parse_config("host").is_err());
        assert!(parse_config("port=abc").is_err());
        assert!(parse_config("sslmode=sometimes").is_err());
    }
}
