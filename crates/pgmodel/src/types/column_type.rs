use std::fmt;

/// A PostgreSQL column type, rendered as its type name in DDL.
///
/// # Examples
///
/// ```ignore
/// use pgmodel::ColumnType;
///
/// assert_eq!(ColumnType::String(Some(40)).to_string(), "varchar(40)");
/// assert_eq!(ColumnType::array(ColumnType::Integer).to_string(), "integer ARRAY");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// `text`, or `varchar(n)` when sized.
    String(Option<u32>),
    Uuid,
    Boolean,
    Integer,
    Number,
    Date,
    Time,
    TzTime,
    Timestamp,
    TzTimestamp,
    TimeInterval,
    /// Array of `inner`. With `dimensions`, renders `inner [n][n]...`;
    /// otherwise `inner ARRAY[n]`.
    Array {
        inner: Box<ColumnType>,
        size: Option<u32>,
        dimensions: Option<u32>,
    },
    BigInteger,
    /// `bit(n)` when fixed, `varbit(n)` otherwise.
    Bit {
        size: u32,
        fixed: bool,
    },
    BigSerial,
    Binary,
    FixedLengthString(u32),
    Money,
    /// `inet` when `inet` is set, `cidr` otherwise.
    IpAddress {
        inet: bool,
    },
    MacAddress,
    Box,
    Line,
    LineSegment,
    Circle,
    Path,
    Point,
    Polygon,
    Double,
    Json,
    JsonB,
    PgLsn,
    Real,
    SmallInteger,
    SmallSerial,
    Serial,
    TsQuery,
    TsVector,
    TxidSnapshot,
    Xml,
    IntegerRange,
    NumericRange,
    DateRange,
    /// Any other type name, used verbatim.
    Custom(String),
}

impl ColumnType {
    /// Unsized, undimensioned array of `inner`.
    pub fn array(inner: ColumnType) -> Self {
        ColumnType::Array {
            inner: Box::new(inner),
            size: None,
            dimensions: None,
        }
    }

    /// Sized array of `inner`, with optional dimensions.
    pub fn sized_array(inner: ColumnType, size: Option<u32>, dimensions: Option<u32>) -> Self {
        ColumnType::Array {
            inner: Box::new(inner),
            size: size.filter(|n| *n > 0),
            dimensions: dimensions.filter(|n| *n > 0),
        }
    }

    pub fn varbit(size: u32) -> Self {
        ColumnType::Bit { size, fixed: false }
    }

    pub fn bit(size: u32) -> Self {
        ColumnType::Bit { size, fixed: true }
    }

    /// The PostgreSQL type name.
    pub fn pg_type_string(&self) -> String {
        let name = match self {
            ColumnType::String(Some(n)) => return format!("varchar({n})"),
            ColumnType::String(None) => "text",
            ColumnType::Array {
                inner,
                size,
                dimensions,
            } => return array_type_string(inner, *size, *dimensions),
            ColumnType::Bit { size, fixed: true } => return format!("bit({size})"),
            ColumnType::Bit { size, fixed: false } => return format!("varbit({size})"),
            ColumnType::FixedLengthString(n) => return format!("char({n})"),
            ColumnType::IpAddress { inet: true } => "inet",
            ColumnType::IpAddress { inet: false } => "cidr",
            ColumnType::Custom(name) => return name.clone(),
            ColumnType::Uuid => "uuid",
            ColumnType::Boolean => "bool",
            ColumnType::Integer => "integer",
            ColumnType::Number => "numeric",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::TzTime => "timetz",
            ColumnType::Timestamp => "timestamp",
            ColumnType::TzTimestamp => "timestamptz",
            ColumnType::TimeInterval => "interval",
            ColumnType::BigInteger => "int8",
            ColumnType::BigSerial => "serial8",
            ColumnType::Binary => "bytea",
            ColumnType::Money => "money",
            ColumnType::MacAddress => "macaddr",
            ColumnType::Box => "box",
            ColumnType::Line => "line",
            ColumnType::LineSegment => "lseg",
            ColumnType::Circle => "circle",
            ColumnType::Path => "path",
            ColumnType::Point => "point",
            ColumnType::Polygon => "polygon",
            ColumnType::Double => "float8",
            ColumnType::Json => "json",
            ColumnType::JsonB => "jsonb",
            ColumnType::PgLsn => "pg_lsn",
            ColumnType::Real => "float4",
            ColumnType::SmallInteger => "int2",
            ColumnType::SmallSerial => "serial2",
            ColumnType::Serial => "serial4",
            ColumnType::TsQuery => "tsquery",
            ColumnType::TsVector => "tsvector",
            ColumnType::TxidSnapshot => "txid_snapshot",
            ColumnType::Xml => "xml",
            ColumnType::IntegerRange => "int4range",
            ColumnType::NumericRange => "numrange",
            ColumnType::DateRange => "daterange",
        };
        name.to_string()
    }
}

fn array_type_string(inner: &ColumnType, size: Option<u32>, dimensions: Option<u32>) -> String {
    match dimensions {
        Some(dims) => {
            let n = size.map(|n| n.to_string()).unwrap_or_default();
            let brackets: String = (0..dims).map(|_| format!("[{n}]")).collect();
            format!("{inner} {brackets}")
        }
        None => match size {
            Some(n) => format!("{inner} ARRAY[{n}]"),
            None => format!("{inner} ARRAY"),
        },
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pg_type_string())
    }
}
