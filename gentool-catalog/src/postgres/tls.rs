//! TLS connector selection for PostgreSQL connections

use std::fs;

use native_tls::{Certificate, TlsConnector};
use postgres_native_tls::MakeTlsConnector;

use super::dsn::{PgConnectOptions, TlsVerify};
use crate::error::Result;

/// Build the connector an `sslmode` asks for, or `None` for plain text.
pub fn connector(options: &PgConnectOptions) -> Result<Option<MakeTlsConnector>> {
    if options.verify == TlsVerify::Disabled {
        return Ok(None);
    }

    let mut builder = TlsConnector::builder();
    if let Some(path) = &options.root_cert {
        let pem = fs::read(path)?;
        builder.add_root_certificate(Certificate::from_pem(&pem)?);
    }
    match options.verify {
        // libpq does not check certificates below verify-ca
        TlsVerify::Encrypt => {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        TlsVerify::VerifyCa => {
            builder.danger_accept_invalid_hostnames(true);
        }
        TlsVerify::VerifyFull | TlsVerify::Disabled => {}
    }
    Ok(Some(MakeTlsConnector::new(builder.build()?)))
}
