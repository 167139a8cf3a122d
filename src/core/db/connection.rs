/// Connection Management Module
///
/// This module defines the `Connection` seam the REPL talks to and the
/// SQL Server implementation behind it. The driver is asynchronous; the
/// connection owns a current-thread runtime and blocks on every call so the
/// rest of the client stays synchronous.

use crate::core::db::query::{QueryOutcome, ResultSet, Value};
use crate::core::{MscliError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use tiberius::{AuthMethod, Client, ColumnData, Config, FromSql, Row};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

/// Application name reported to the server on login.
pub const APPLICATION_NAME: &str = "mscli";

/// A live handle to the database server.
///
/// Exactly one connection is open for the lifetime of a session and every
/// query runs on it to completion before the next one starts.
pub trait Connection {
    /// Executes a query batch and returns its first result.
    fn execute(&mut self, sql: &str) -> Result<QueryOutcome>;

    /// Releases the connection.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Parameters needed to open a connection.
#[derive(Clone, PartialEq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Accept the server certificate without validation
    pub trust_cert: bool,
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("trust_cert", &self.trust_cert)
            .finish()
    }
}

impl ConnectParams {
    /// Builds the driver configuration for these parameters.
    pub fn to_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.authentication(AuthMethod::sql_server(&self.username, &self.password));
        config.application_name(APPLICATION_NAME);
        if self.trust_cert {
            config.trust_cert();
        }
        config
    }

    /// The same login aimed at the host a gateway routed us to.
    pub fn redirected(&self, host: &str, port: u16) -> Self {
        ConnectParams {
            host: host.to_string(),
            port,
            ..self.clone()
        }
    }
}

async fn login(
    config: Config,
) -> std::result::Result<Client<Compat<TcpStream>>, tiberius::error::Error> {
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;
    Client::connect(config, tcp.compat_write()).await
}

/// A connection to SQL Server over TDS.
pub struct SqlServerConnection {
    runtime: Runtime,
    client: Client<Compat<TcpStream>>,
}

impl SqlServerConnection {
    /// Opens a connection and logs in with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns `MscliError::Server` when the server rejects the login and
    /// `MscliError::Driver` or `MscliError::Io` when it cannot be reached.
    pub fn open(params: &ConnectParams) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let config = params.to_config();

        info!(host = %params.host, port = params.port, "opening connection");
        let client = match runtime.block_on(login(config)) {
            Err(tiberius::error::Error::Routing { host, port }) => {
                info!(%host, port, "server redirected the login");
                runtime.block_on(login(params.redirected(&host, port).to_config()))?
            }
            result => result?,
        };
        info!("connection established");

        Ok(SqlServerConnection { runtime, client })
    }
}

impl Connection for SqlServerConnection {
    fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        let SqlServerConnection { runtime, client } = self;
        runtime.block_on(async {
            let mut stream = client.simple_query(sql).await?;
            let columns: Option<Vec<String>> = stream.columns().await?.map(|columns| {
                columns
                    .iter()
                    .map(|column| column.name().to_string())
                    .collect()
            });
            let rows = stream.into_first_result().await?;

            match columns {
                Some(columns) => {
                    let rows = rows
                        .into_iter()
                        .map(row_values)
                        .collect::<Result<Vec<_>>>()?;
                    debug!(rows = rows.len(), "query returned a result set");
                    Ok(QueryOutcome::Rows(ResultSet::new(columns, rows)))
                }
                None => Ok(QueryOutcome::NoRows),
            }
        })
    }

    fn close(self) -> Result<()> {
        let SqlServerConnection { runtime, client } = self;
        runtime.block_on(client.close())?;
        info!("connection closed");
        Ok(())
    }
}

fn row_values(row: Row) -> Result<Vec<Value>> {
    row.into_iter().map(column_value).collect()
}

/// Converts one column of a driver row into a display value.
fn column_value(data: ColumnData<'static>) -> Result<Value> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| Value::Int(v.into())),
        ColumnData::I16(v) => v.map(|v| Value::Int(v.into())),
        ColumnData::I32(v) => v.map(|v| Value::Int(v.into())),
        ColumnData::I64(v) => v.map(Value::Int),
        ColumnData::F32(v) => v.map(|v| Value::Float(v.into())),
        ColumnData::F64(v) => v.map(Value::Float),
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::String(v) => v.map(|s| Value::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| Value::Text(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| Value::Binary(b.into_owned())),
        ColumnData::Numeric(v) => v.map(|n| Value::Decimal(n.to_string())),
        ColumnData::Xml(v) => v.map(|x| Value::Text(x.into_owned().into_string())),
        other => temporal_value(&other)?,
    };
    Ok(value.unwrap_or(Value::Null))
}

fn temporal_value(data: &ColumnData<'static>) -> Result<Option<Value>> {
    let text = match data {
        ColumnData::Date(_) => NaiveDate::from_sql(data)?.map(|v| v.to_string()),
        ColumnData::Time(_) => NaiveTime::from_sql(data)?.map(|v| v.to_string()),
        ColumnData::DateTimeOffset(_) => {
            DateTime::<FixedOffset>::from_sql(data)?.map(|v| v.to_string())
        }
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data)?.map(|v| v.to_string())
        }
        other => {
            return Err(MscliError::Driver(tiberius::error::Error::Conversion(
                format!("unsupported column type: {:?}", other).into(),
            )))
        }
    };
    Ok(text.map(Value::Temporal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn params() -> ConnectParams {
        ConnectParams {
            host: "db.internal".to_string(),
            port: 1433,
            username: "sa".to_string(),
            password: "hunter2".to_string(),
            trust_cert: true,
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", params());
        assert!(rendered.contains("db.internal"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_config_address() {
        let config = params().to_config();
        assert_eq!(config.get_addr(), "db.internal:1433");
    }

    #[test]
    fn test_redirect_keeps_credentials() {
        let redirected = params().redirected("node-7.gateway.internal", 11000);
        assert_eq!(redirected.host, "node-7.gateway.internal");
        assert_eq!(redirected.port, 11000);
        assert_eq!(redirected.username, "sa");
        assert_eq!(redirected.password, "hunter2");
        assert_eq!(
            redirected.to_config().get_addr(),
            "node-7.gateway.internal:11000"
        );
    }

    #[test]
    fn test_scalar_conversion() {
        assert_eq!(column_value(ColumnData::I32(Some(42))).unwrap(), Value::Int(42));
        assert_eq!(column_value(ColumnData::I32(None)).unwrap(), Value::Null);
        assert_eq!(column_value(ColumnData::Bit(Some(true))).unwrap(), Value::Bool(true));
        assert_eq!(
            column_value(ColumnData::String(Some(Cow::Borrowed("")))).unwrap(),
            Value::Text(String::new())
        );
        assert_eq!(column_value(ColumnData::String(None)).unwrap(), Value::Null);
        assert_eq!(
            column_value(ColumnData::Binary(Some(Cow::Owned(vec![0xde, 0xad])))).unwrap(),
            Value::Binary(vec![0xde, 0xad])
        );
    }

    #[test]
    fn test_temporal_conversion() {
        let epoch = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let days = (date - epoch).num_days() as u32;
        let data = ColumnData::Date(Some(tiberius::time::Date::new(days)));
        assert_eq!(
            column_value(data).unwrap(),
            Value::Temporal("2024-02-29".to_string())
        );
        assert_eq!(column_value(ColumnData::Date(None)).unwrap(), Value::Null);
    }
}
