use std::error::Error;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use tokio_postgres::{Client, NoTls, Statement};
use tokio_util::bytes::BytesMut;
use tracing::error;
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

/// PostgreSQL driver implementation using tokio-postgres.
///
/// Every statement is prepared first so each [`SqlValue`] can be converted to
/// the parameter type the server inferred for its placeholder.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| ModelError::ConnectionFailed(e.to_string()))?;

        // The connection object drives the socket; it must be polled separately.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self { client })
    }

    async fn prepare(&self, sql: &str, params: &[SqlValue]) -> Result<(Statement, Vec<Bound>)> {
        let statement = self.client.prepare(sql).await?;
        let types = statement.params();
        if types.len() != params.len() {
            return Err(ModelError::QueryFailed(format!(
                "statement expects {} parameters, got {}",
                types.len(),
                params.len()
            )));
        }
        let bound = params
            .iter()
            .zip(types)
            .enumerate()
            .map(|(i, (value, ty))| bind(value, ty, i + 1))
            .collect::<Result<Vec<_>>>()?;
        Ok((statement, bound))
    }
}

fn param_refs(bound: &[Bound]) -> Vec<&(dyn ToSql + Sync)> {
    bound.iter().map(|b| b as &(dyn ToSql + Sync)).collect()
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let (statement, bound) = self.prepare(sql, params).await?;
        let rows = self.client.query(&statement, &param_refs(&bound)).await?;

        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let result_rows = rows
            .iter()
            .map(|row| {
                (0..row.columns().len())
                    .map(|i| row_value_to_string(row, i))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawQueryResult::new(columns, result_rows))
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let (statement, bound) = self.prepare(sql, params).await?;
        Ok(self.client.execute(&statement, &param_refs(&bound)).await?)
    }
}

/// A parameter already converted to the Rust type matching its placeholder.
#[derive(Debug, Clone, PartialEq)]
enum Bound {
    Null,
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Text(String),
    Numeric(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
}

impl ToSql for Bound {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Bound::Null => Ok(IsNull::Yes),
            Bound::Int16(v) => v.to_sql(ty, out),
            Bound::Int32(v) => v.to_sql(ty, out),
            Bound::Int64(v) => v.to_sql(ty, out),
            Bound::Float32(v) => v.to_sql(ty, out),
            Bound::Float64(v) => v.to_sql(ty, out),
            Bound::Bool(v) => v.to_sql(ty, out),
            Bound::Text(v) => v.to_sql(ty, out),
            Bound::Numeric(raw) => {
                out.extend_from_slice(raw);
                Ok(IsNull::No)
            }
            Bound::Date(v) => v.to_sql(ty, out),
            Bound::Time(v) => v.to_sql(ty, out),
            Bound::Timestamp(v) => v.to_sql(ty, out),
            Bound::TimestampTz(v) => v.to_sql(ty, out),
            Bound::Uuid(v) => v.to_sql(ty, out),
            Bound::Json(v) => v.to_sql(ty, out),
        }
    }

    // `bind` only produces a variant whose Rust type the parameter accepts.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn is_text(ty: &Type) -> bool {
    <String as ToSql>::accepts(ty)
}

/// Convert `value` for the placeholder `$position` of type `ty`.
///
/// Integers are narrowed or widened to the column's width, text is parsed for
/// numeric, boolean, temporal, uuid and json parameters, and NULL fits any type.
fn bind(value: &SqlValue, ty: &Type, position: usize) -> Result<Bound> {
    let bound = match value {
        SqlValue::Null => Some(Bound::Null),
        SqlValue::Int32(n) => bind_integer(i64::from(*n), ty),
        SqlValue::Int64(n) => bind_integer(*n, ty),
        SqlValue::Float64(f) => bind_float(*f, ty),
        SqlValue::Bool(b) => match *ty {
            Type::BOOL => Some(Bound::Bool(*b)),
            _ if is_text(ty) => Some(Bound::Text(b.to_string())),
            _ => None,
        },
        SqlValue::Text(s) => bind_text(s, ty),
    };
    bound.ok_or_else(|| ModelError::InvalidValue {
        column: format!("${}", position),
        value: format!("{:?} does not fit {}", value, ty),
    })
}

fn bind_integer(n: i64, ty: &Type) -> Option<Bound> {
    match *ty {
        Type::INT2 => i16::try_from(n).ok().map(Bound::Int16),
        Type::INT4 => i32::try_from(n).ok().map(Bound::Int32),
        Type::INT8 => Some(Bound::Int64(n)),
        Type::FLOAT4 => Some(Bound::Float32(n as f32)),
        Type::FLOAT8 => Some(Bound::Float64(n as f64)),
        Type::NUMERIC => encode_numeric(&n.to_string()).map(Bound::Numeric),
        _ if is_text(ty) => Some(Bound::Text(n.to_string())),
        _ => None,
    }
}

fn bind_float(f: f64, ty: &Type) -> Option<Bound> {
    match *ty {
        Type::FLOAT4 => Some(Bound::Float32(f as f32)),
        Type::FLOAT8 => Some(Bound::Float64(f)),
        Type::NUMERIC if f.is_nan() => encode_numeric("NaN").map(Bound::Numeric),
        Type::NUMERIC if f.is_finite() => encode_numeric(&f.to_string()).map(Bound::Numeric),
        _ if is_text(ty) => Some(Bound::Text(f.to_string())),
        _ => None,
    }
}

fn bind_text(s: &str, ty: &Type) -> Option<Bound> {
    if is_text(ty) {
        return Some(Bound::Text(s.to_string()));
    }
    let trimmed = s.trim();
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => {
            trimmed.parse::<i64>().ok().and_then(|n| bind_integer(n, ty))
        }
        Type::FLOAT4 | Type::FLOAT8 => trimmed.parse::<f64>().ok().and_then(|f| bind_float(f, ty)),
        Type::NUMERIC => encode_numeric(trimmed).map(Bound::Numeric),
        Type::BOOL => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(Bound::Bool(true)),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(Bound::Bool(false)),
            _ => None,
        },
        Type::DATE => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .map(Bound::Date),
        Type::TIME => NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
            .ok()
            .map(Bound::Time),
        Type::TIMESTAMP => parse_naive_datetime(trimmed).map(Bound::Timestamp),
        Type::TIMESTAMPTZ => DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| parse_naive_datetime(trimmed).map(|dt| Utc.from_utc_datetime(&dt)))
            .map(Bound::TimestampTz),
        Type::UUID => Uuid::parse_str(trimmed).ok().map(Bound::Uuid),
        Type::JSON | Type::JSONB => serde_json::from_str(s).ok().map(Bound::Json),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS[.f]`, the `T`-separated form, or a bare date.
fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// A `numeric` cell decoded from the binary wire format into its text form.
struct NumericText(String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(
        _ty: &Type,
        raw: &'a [u8],
    ) -> std::result::Result<Self, Box<dyn Error + Sync + Send>> {
        decode_numeric(raw).map(NumericText)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Encode a plain decimal literal (`-12.50`, `7`, `NaN`) in the binary
/// `numeric` format. Exponent notation is not accepted.
fn encode_numeric(literal: &str) -> Option<Vec<u8>> {
    if literal.eq_ignore_ascii_case("nan") {
        return Some(numeric_bytes(0, NUMERIC_NAN, 0, &[]));
    }
    let (negative, unsigned) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal.strip_prefix('+').unwrap_or(literal)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if int_part.is_empty() && frac_part.is_empty()
        || !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let dscale = u16::try_from(frac_part.len()).ok()?;

    let int_part = int_part.trim_start_matches('0');
    let int_pad = (4 - int_part.len() % 4) % 4;
    let frac_pad = (4 - frac_part.len() % 4) % 4;
    let padded: String = "0"
        .repeat(int_pad)
        .chars()
        .chain(int_part.chars())
        .chain(frac_part.chars())
        .chain("0".repeat(frac_pad).chars())
        .collect();
    let mut groups: Vec<i16> = padded
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0i16, |acc, b| acc * 10 + i16::from(b - b'0'))
        })
        .collect();

    let mut weight = i32::try_from((int_part.len() + int_pad) / 4).ok()? - 1;
    let leading = groups.iter().take_while(|g| **g == 0).count();
    groups.drain(..leading);
    weight -= i32::try_from(leading).ok()?;
    while groups.last() == Some(&0) {
        groups.pop();
    }

    if groups.is_empty() {
        return Some(numeric_bytes(0, 0, dscale, &[]));
    }
    let sign = if negative { NUMERIC_NEG } else { 0 };
    Some(numeric_bytes(i16::try_from(weight).ok()?, sign, dscale, &groups))
}

fn numeric_bytes(weight: i16, sign: u16, dscale: u16, digits: &[i16]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(8 + digits.len() * 2);
    raw.extend_from_slice(&(digits.len() as i16).to_be_bytes());
    raw.extend_from_slice(&weight.to_be_bytes());
    raw.extend_from_slice(&sign.to_be_bytes());
    raw.extend_from_slice(&dscale.to_be_bytes());
    for digit in digits {
        raw.extend_from_slice(&digit.to_be_bytes());
    }
    raw
}

/// Header of four big-endian 16-bit words (ndigits, weight, sign, dscale)
/// followed by `ndigits` base-10000 digits.
fn decode_numeric(raw: &[u8]) -> std::result::Result<String, Box<dyn Error + Sync + Send>> {
    let word = |i: usize| -> std::result::Result<i16, Box<dyn Error + Sync + Send>> {
        raw.get(i * 2..i * 2 + 2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric value".into())
    };

    let ndigits = word(0)?.max(0) as usize;
    let weight = i32::from(word(1)?);
    let sign = word(2)? as u16;
    let dscale = word(3)?.max(0) as usize;

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        _ => {}
    }

    let digits = (0..ndigits)
        .map(|i| word(4 + i))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let digit = |i: i32| -> i16 {
        usize::try_from(i)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        out.push_str(&digit(0).to_string());
        for i in 1..=weight {
            out.push_str(&format!("{:04}", digit(i)));
        }
    }
    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut i = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit(i)));
            i += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }
    Ok(out)
}

/// Convert the cell at `index` to text, `None` for NULL.
///
/// Conversion follows the column's declared type; a type with no mapping is an
/// error rather than a NULL so a present value is never mistaken for a missing one.
fn row_value_to_string(row: &tokio_postgres::Row, index: usize) -> Result<Option<String>> {
    let column = &row.columns()[index];
    let ty = column.type_();

    let text = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(index)?.map(|v| v.to_string()),
        Type::INT2 => row.try_get::<_, Option<i16>>(index)?.map(|v| v.to_string()),
        Type::INT4 => row.try_get::<_, Option<i32>>(index)?.map(|v| v.to_string()),
        Type::INT8 => row.try_get::<_, Option<i64>>(index)?.map(|v| v.to_string()),
        Type::OID => row.try_get::<_, Option<u32>>(index)?.map(|v| v.to_string()),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(index)?.map(|v| v.to_string()),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(index)?.map(|v| v.to_string()),
        Type::NUMERIC => row.try_get::<_, Option<NumericText>>(index)?.map(|v| v.0),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(index)?.map(|v| v.to_string()),
        Type::TIME => row.try_get::<_, Option<NaiveTime>>(index)?.map(|v| v.to_string()),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(index)?
            .map(|v| v.to_string()),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(index)?
            .map(|v| v.to_rfc3339()),
        Type::UUID => row.try_get::<_, Option<Uuid>>(index)?.map(|v| v.to_string()),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(index)?
            .map(|v| v.to_string()),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(index)?.map(|bytes| {
            let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
            format!("\\x{}", hex)
        }),
        _ if <String as FromSql>::accepts(ty) => row.try_get::<_, Option<String>>(index)?,
        _ => {
            return Err(ModelError::UnsupportedType {
                column: column.name().to_string(),
                type_name: ty.name().to_string(),
            })
        }
    };
    Ok(text)
}
