//! Extract command - pull coupon fields from a single OCR capture.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use coupr_core::models::config::CouprConfig;
use coupr_core::{
    CouponInput, CouponParser, CouponRecord, ExtractionResult, NominatimGeocoder, ParsedCoupon,
};

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (JSON coupon input or plain OCR text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// File with known brand names, one per line
    #[arg(long)]
    brands: Option<PathBuf>,

    /// Known brand name (repeatable)
    #[arg(long = "brand")]
    brand: Vec<String>,

    /// Skip geocode validation of the address
    #[arg(long)]
    no_geocode: bool,

    /// Emit a backend record for this owner instead of the bare coupon
    #[arg(long)]
    owner: Option<String>,

    /// Use the offer headline as title when no discount is found
    #[arg(long)]
    fallback_title: bool,

    /// Print extraction warnings to stderr
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting coupon from {}", args.input.display());

    let mut brands = args.brand.clone();
    if let Some(path) = &args.brands {
        brands.extend(read_brand_file(path)?);
    }

    let parser = build_parser(&config, brands, args.fallback_title);
    let geocoder = build_geocoder(&config, args.no_geocode)?;

    let input = read_input(&args.input)?;
    let result = extract(&parser, &input, geocoder.as_ref()).await;

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = match &args.owner {
        Some(owner) => {
            let record =
                CouponRecord::from_parsed(owner.as_str(), &result.coupon, &result.raw_text)?;
            match args.format {
                OutputFormat::Json => serde_json::to_string_pretty(&record)?,
                _ => anyhow::bail!("--owner only supports JSON output"),
            }
        }
        None => format_coupon(&result.coupon, args.format)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total extraction time: {:?}", start.elapsed());

    Ok(())
}

/// Build a parser from configuration plus command-line overrides.
pub fn build_parser(
    config: &CouprConfig,
    brands: Vec<String>,
    fallback_title: bool,
) -> CouponParser {
    CouponParser::from_config(&config.extraction)
        .with_brands(brands)
        .with_fallback_title(config.extraction.fallback_title || fallback_title)
}

/// Create the HTTP geocoder unless geocoding is turned off.
pub fn build_geocoder(
    config: &CouprConfig,
    no_geocode: bool,
) -> anyhow::Result<Option<NominatimGeocoder>> {
    if no_geocode || !config.extraction.try_geocode {
        debug!("Geocoding disabled");
        return Ok(None);
    }
    Ok(Some(NominatimGeocoder::new(&config.geocoder)?))
}

/// Run extraction, geocoding the address when a geocoder is available.
pub async fn extract(
    parser: &CouponParser,
    input: &CouponInput,
    geocoder: Option<&NominatimGeocoder>,
) -> ExtractionResult {
    match geocoder {
        Some(geocoder) => parser.parse_with_geocoder(input, geocoder).await,
        None => parser.parse(input),
    }
}

/// Read an input file: `.json` files hold a full coupon input, anything
/// else is treated as plain OCR text.
pub fn read_input(path: &Path) -> anyhow::Result<CouponInput> {
    let content = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(CouponInput::from_json(&content)?)
    } else {
        Ok(CouponInput::from_text(content))
    }
}

/// Read brand names, one per line. Blank lines and `#` comments are skipped.
pub fn read_brand_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read brands file {}: {}", path.display(), e))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub fn format_coupon(coupon: &ParsedCoupon, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(coupon)?),
        OutputFormat::Csv => format_csv(coupon),
        OutputFormat::Text => Ok(format_text(coupon)),
    }
}

pub const CSV_HEADER: [&str; 10] = [
    "store",
    "address",
    "phone",
    "mode",
    "location_note",
    "terms",
    "title",
    "expires_at",
    "lat",
    "lng",
];

pub fn csv_fields(coupon: &ParsedCoupon) -> [String; 10] {
    [
        coupon.store.clone().unwrap_or_default(),
        coupon.address.clone().unwrap_or_default(),
        coupon.phone.clone().unwrap_or_default(),
        coupon.mode.as_str().to_string(),
        coupon.location_note.clone().unwrap_or_default(),
        coupon.terms.clone().unwrap_or_default(),
        coupon.title.clone().unwrap_or_default(),
        coupon.expires_at.map(|d| d.to_string()).unwrap_or_default(),
        coupon.geo.map(|g| g.lat.to_string()).unwrap_or_default(),
        coupon.geo.map(|g| g.lng.to_string()).unwrap_or_default(),
    ]
}

fn format_csv(coupon: &ParsedCoupon) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_fields(coupon))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(coupon: &ParsedCoupon) -> String {
    let mut output = String::new();
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    output.push_str(&format!("Store:   {}\n", field(&coupon.store)));
    output.push_str(&format!("Offer:   {}\n", field(&coupon.title)));
    output.push_str(&format!(
        "Expires: {}\n",
        coupon
            .expires_at
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push('\n');

    output.push_str(&format!("Address: {}\n", field(&coupon.address)));
    if let Some(geo) = coupon.geo {
        output.push_str(&format!("         ({:.5}, {:.5})\n", geo.lat, geo.lng));
    }
    output.push_str(&format!("Phone:   {}\n", field(&coupon.phone)));
    if !coupon.mode.as_str().is_empty() {
        output.push_str(&format!("Mode:    {}\n", coupon.mode.as_str()));
    }
    if let Some(note) = &coupon.location_note {
        output.push_str(&format!("Where:   {}\n", note));
    }

    if let Some(terms) = &coupon.terms {
        output.push_str(&format!("\nTerms:\n  {}\n", terms.replace('\n', "\n  ")));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use chrono::NaiveDate;
    use coupr_core::RedemptionMode;

    fn sample() -> ParsedCoupon {
        ParsedCoupon {
            store: Some("SUBWAY".to_string()),
            title: Some("$5 off".to_string()),
            mode: RedemptionMode::Pickup,
            expires_at: NaiveDate::from_ymd_opt(2026, 12, 31),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_csv() {
        let csv = format_coupon(&sample(), OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("store,address,phone,mode,location_note,terms,title,expires_at,lat,lng")
        );
        assert_eq!(lines.next(), Some("SUBWAY,,,pickup,,,$5 off,2026-12-31,,"));
    }

    #[test]
    fn test_format_text() {
        let text = format_coupon(&sample(), OutputFormat::Text).unwrap();
        assert!(text.contains("Store:   SUBWAY"));
        assert!(text.contains("Mode:    pickup"));
        assert!(text.contains("Address: -"));
    }

    #[test]
    fn test_read_brand_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# brands\nChipotle\n\n  Five Guys  ").unwrap();

        let brands = read_brand_file(file.path()).unwrap();
        assert_eq!(brands, vec!["Chipotle".to_string(), "Five Guys".to_string()]);
    }

    #[test]
    fn test_read_input_plain_text() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "SUBWAY\n$5 off").unwrap();

        let input = read_input(file.path()).unwrap();
        assert_eq!(input.text, "SUBWAY\n$5 off");
        assert!(input.blocks.is_empty());
    }

    #[test]
    fn test_read_input_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"text": "SUBWAY", "brands": ["Subway"], "tryGeocode": false}}"#).unwrap();

        let input = read_input(file.path()).unwrap();
        assert_eq!(input.brands, vec!["Subway".to_string()]);
        assert_eq!(input.try_geocode, Some(false));
    }
}
