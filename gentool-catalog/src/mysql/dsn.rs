//! MySQL DSN parsing
//!
//! Accepts `mysql://` URLs as understood by `mysql_async`, and the classic
//! `user:password@tcp(host:port)/dbname?param=value` form.

use crate::error::{Error, Result};
use mysql_async::{Opts, OptsBuilder};
use tracing::debug;

const DEFAULT_PORT: u16 = 3306;

/// Parse a MySQL DSN into connection options.
pub fn parse_dsn(dsn: &str) -> Result<Opts> {
    if dsn.starts_with("mysql://") {
        return Opts::from_url(dsn).map_err(|e| Error::InvalidDsn(e.to_string()));
    }

    let (head, query) = match dsn.split_once('?') {
        Some((head, query)) => (head, Some(query)),
        None => (dsn, None),
    };
    let slash = head
        .rfind('/')
        .ok_or_else(|| Error::InvalidDsn(format!("missing '/dbname' in {:?}", head)))?;
    let (before, db_name) = (&head[..slash], &head[slash + 1..]);

    let (userinfo, address) = match before.rfind('@') {
        Some(at) => (Some(&before[..at]), &before[at + 1..]),
        None => (None, before),
    };

    let mut builder = OptsBuilder::default();
    if let Some(userinfo) = userinfo {
        let (user, pass) = match userinfo.split_once(':') {
            Some((user, pass)) => (user, Some(pass)),
            None => (userinfo, None),
        };
        if !user.is_empty() {
            builder = builder.user(Some(user));
        }
        builder = builder.pass(pass);
    }
    if !db_name.is_empty() {
        builder = builder.db_name(Some(db_name));
    }

    builder = apply_address(builder, address)?;

    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let key = pair.split_once('=').map(|(k, _)| k).unwrap_or(pair);
            // charset, parseTime, loc and friends only matter to other client libraries
            debug!(option = key, "ignoring MySQL DSN option");
        }
    }

    Ok(Opts::from(builder))
}

fn apply_address(builder: OptsBuilder, address: &str) -> Result<OptsBuilder> {
    if address.is_empty() {
        return Ok(builder);
    }
    if let Some(path) = address
        .strip_prefix("unix(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return Ok(builder.socket(Some(path)));
    }
    let host_port = match address.strip_prefix("tcp(") {
        Some(rest) => rest
            .strip_suffix(')')
            .ok_or_else(|| Error::InvalidDsn(format!("unterminated address {:?}", address)))?,
        None => address,
    };
    if host_port.is_empty() {
        return Ok(builder);
    }
    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| Error::InvalidDsn(format!("invalid port {:?}", port)))?;
            (host, port)
        }
        None => (host_port, DEFAULT_PORT),
    };
    Ok(builder.ip_or_hostname(host).tcp_port(port))
}
