use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use nu_plugin_agronomy::ops;
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(
    name = "agronomy",
    version,
    about = "Nearest-centroid crop and fertilizer recommendations"
)]
struct Cli {
    /// Start as an MCP (Model Context Protocol) server on stdio.
    /// AI assistants (Claude Desktop, Cursor, etc.) connect via JSON-RPC.
    #[cfg(feature = "mcp")]
    #[arg(long, exclusive = true)]
    mcp: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Per-field readings. Any flag given turns the call into a single-record
/// run; with no flags the records are read from stdin as JSON.
#[derive(Args, Default)]
struct Readings {
    #[arg(long)]
    nitrogen: Option<String>,
    #[arg(long, alias = "phosphorus")]
    phosphorous: Option<String>,
    #[arg(long)]
    potassium: Option<String>,
    #[arg(long)]
    temperature: Option<String>,
    #[arg(long)]
    humidity: Option<String>,
    #[arg(long)]
    ph: Option<String>,
    #[arg(long)]
    rainfall: Option<String>,
    #[arg(long)]
    moisture: Option<String>,
    /// Soil type (fertilizer only), e.g. Loamy
    #[arg(long = "soil-type")]
    soil_type: Option<String>,
    /// Crop type (fertilizer only), e.g. Sugarcane
    #[arg(long = "crop-type")]
    crop_type: Option<String>,
}

impl Readings {
    /// The given flags as a JSON record, or `None` when no flag was set.
    fn to_record(&self) -> Option<Value> {
        let fields = [
            ("nitrogen", &self.nitrogen),
            ("phosphorous", &self.phosphorous),
            ("potassium", &self.potassium),
            ("temperature", &self.temperature),
            ("humidity", &self.humidity),
            ("ph", &self.ph),
            ("rainfall", &self.rainfall),
            ("moisture", &self.moisture),
            ("soilType", &self.soil_type),
            ("cropType", &self.crop_type),
        ];
        let record: Map<String, Value> = fields
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| (key.to_string(), Value::String(v.clone())))
            })
            .collect();
        (!record.is_empty()).then_some(Value::Object(record))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a crop for each soil/climate reading
    Crop {
        #[command(flatten)]
        readings: Readings,
    },
    /// Recommend a fertilizer for each reading
    Fertilizer {
        #[command(flatten)]
        readings: Readings,
    },
    /// Score soil health and suggest improvements
    Soil {
        #[command(flatten)]
        readings: Readings,
    },
    /// Market price outlook for a crop
    Price {
        /// Crop name (case-insensitive). Omit to list every known crop.
        crop: Option<String>,
    },
    /// Classify JSON records against a reference table
    Classify {
        /// Path to a reference table JSON file
        #[arg(short, long)]
        table: Option<String>,
        /// Builtin table, used when no --table is given: crop, fertilizer
        #[arg(short, long, default_value = "crop")]
        builtin: String,
    },
    /// Describe a WMO weather interpretation code
    #[command(name = "weather-code")]
    WeatherCode {
        /// WMO code, e.g. 63
        #[arg(allow_negative_numbers = true)]
        code: i64,
    },
    /// Print a builtin reference table as JSON
    Table {
        /// Builtin table: crop, fertilizer
        name: String,
    },
}

fn main() -> Result<()> {
    nu_plugin_agronomy::init_logging();
    let cli = Cli::parse();

    // ── MCP server mode ─────────────────────────────────────────────────
    #[cfg(feature = "mcp")]
    if cli.mcp {
        let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
        return rt
            .block_on(nu_plugin_agronomy::mcp::serve_stdio())
            .map_err(|e| anyhow::anyhow!("MCP server error: {e}"));
    }

    // ── Normal subcommand dispatch ──────────────────────────────────────
    let Some(command) = cli.command else {
        bail!("No subcommand provided. Run `agronomy --help` for usage.");
    };

    let output = match command {
        Commands::Crop { readings } => ops::op_crop(&records(&readings)?)?,
        Commands::Fertilizer { readings } => ops::op_fertilizer(&records(&readings)?)?,
        Commands::Soil { readings } => ops::op_soil(&records(&readings)?),
        Commands::Price { crop } => match crop {
            Some(crop) => ops::op_price(&crop),
            None => ops::op_price_all(),
        },
        Commands::Classify { table, builtin } => {
            let rows = read_stdin_json()?;
            let table = ops::resolve_table(None, table.as_deref(), Some(builtin.as_str()))?;
            ops::op_classify(&rows, &table)
        }
        Commands::WeatherCode { code } => ops::op_weather_code(code),
        Commands::Table { name } => ops::op_table(&name)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn records(readings: &Readings) -> Result<Vec<Value>> {
    match readings.to_record() {
        Some(record) => Ok(vec![record]),
        None => read_stdin_json(),
    }
}

fn read_stdin_json() -> Result<Vec<Value>> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    let parsed: Value = serde_json::from_str(&buf).context("invalid JSON on stdin")?;
    Ok(match parsed {
        Value::Array(arr) => arr,
        single => vec![single],
    })
}
