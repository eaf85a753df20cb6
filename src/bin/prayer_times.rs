//! Prayer Times Command-Line Tool
//!
//! Computes the daily prayer times, Qibla bearing, and Hijri date for a
//! location, or (with --reverse) recovers the twilight angles behind a set
//! of observed times.
//!
//! Usage:
//!   cargo run --bin prayer_times -- 40.7128 -74.0060 --method isna
//!   cargo run --bin prayer_times -- --list-methods
//!   cargo run --bin prayer_times -- 40.7128 -74.0060 --reverse \
//!       --fajr 05:45 --maghrib 16:40 --isha 18:05

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone};
use clap::{ArgAction, Parser};
use miqat::{
    compute_prayer_times, infer_angles, AsrSchool, IshaRule, MethodTable, Settings,
};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Islamic Prayer Time Calculator
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Calculates Islamic prayer times, Qibla direction, and Hijri dates",
    long_about = None
)]
struct Args {
    /// Latitude in degrees (-90 to 90, positive north)
    #[arg(required_unless_present = "list_methods", allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Longitude in degrees (-180 to 180, positive east)
    #[arg(required_unless_present = "list_methods", allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Elevation in meters above sea level
    #[arg(short, long, default_value_t = 0.0)]
    elevation: f64,

    /// Date to calculate for (YYYY-MM-DD, default today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// UTC offset of the output clock, e.g. -05:00 (default: system offset)
    #[arg(short = 'z', long, value_parser = parse_utc_offset, allow_hyphen_values = true)]
    utc_offset: Option<FixedOffset>,

    /// Calculation method key (see --list-methods)
    #[arg(short, long, default_value = "isna")]
    method: String,

    /// Asr shadow convention
    #[arg(short, long, value_enum, default_value = "standard")]
    asr_method: AsrArg,

    /// Days to shift the computed Hijri date (+ or -)
    #[arg(long, default_value_t = 0)]
    hijri_correction: i64,

    /// Custom Fajr angle in degrees (0 to 30, overrides the method)
    #[arg(long)]
    fajr_angle: Option<f64>,

    /// Custom Isha angle in degrees (0 to 30, overrides the method)
    #[arg(long, conflicts_with = "isha_interval")]
    isha_angle: Option<f64>,

    /// Fixed Isha interval in minutes after Maghrib (0 to 240)
    #[arg(long)]
    isha_interval: Option<f64>,

    /// List all available calculation methods and exit
    #[arg(long, action = ArgAction::SetTrue)]
    list_methods: bool,

    /// Recover twilight angles from observed times instead
    #[arg(long, action = ArgAction::SetTrue, requires_all = ["fajr", "maghrib", "isha"])]
    reverse: bool,

    /// Observed Fajr time (HH:MM), reverse mode only
    #[arg(long, value_parser = parse_clock_time)]
    fajr: Option<NaiveTime>,

    /// Observed Maghrib time (HH:MM), reverse mode only
    #[arg(long, value_parser = parse_clock_time)]
    maghrib: Option<NaiveTime>,

    /// Observed Isha time (HH:MM), reverse mode only
    #[arg(long, value_parser = parse_clock_time)]
    isha: Option<NaiveTime>,
}

/// Asr convention as a CLI argument
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum AsrArg {
    Standard,
    Hanafi,
}

impl From<AsrArg> for AsrSchool {
    fn from(arg: AsrArg) -> Self {
        match arg {
            AsrArg::Standard => AsrSchool::Standard,
            AsrArg::Hanafi => AsrSchool::Hanafi,
        }
    }
}

/// Parse a UTC offset of the form "+05:30", "-08:00", or "+5".
fn parse_utc_offset(s: &str) -> std::result::Result<FixedOffset, String> {
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };

    let (hours_str, minutes_str) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = hours_str
        .parse()
        .map_err(|_| format!("invalid UTC offset '{}', expected +HH:MM", s))?;
    let minutes: i32 = minutes_str
        .parse()
        .map_err(|_| format!("invalid UTC offset '{}', expected +HH:MM", s))?;

    let seconds = sign * (hours * 3600 + minutes * 60);
    FixedOffset::east_opt(seconds).ok_or_else(|| format!("UTC offset '{}' out of range", s))
}

fn parse_clock_time(s: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| format!("invalid time '{}', expected HH:MM", s))
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

fn describe_isha(isha: IshaRule) -> String {
    match isha {
        IshaRule::Angle { degrees } => format!("{} deg", degrees),
        IshaRule::FixedInterval {
            normal_minutes,
            ramadan_minutes,
        } => {
            if normal_minutes == ramadan_minutes {
                format!("{} min after Maghrib", normal_minutes)
            } else {
                format!(
                    "{} min after Maghrib ({} min in Ramadan)",
                    normal_minutes, ramadan_minutes
                )
            }
        }
    }
}

fn display_methods(table: &MethodTable) {
    print_section_header("Available calculation methods");
    for key in table.keys() {
        if let Some(method) = table.get(key) {
            println!("{:8} {}", key, method.name);
            println!(
                "         Fajr: {} deg, Isha: {}",
                method.fajr_angle,
                describe_isha(method.isha)
            );
        }
    }
}

/// Midnight of the requested date in the requested clock frame.
fn observation_instant(
    date: Option<NaiveDate>,
    offset: Option<FixedOffset>,
) -> Result<DateTime<FixedOffset>> {
    let offset = offset.unwrap_or_else(|| Local::now().offset().fix());
    let date = date.unwrap_or_else(|| Local::now().with_timezone(&offset).date_naive());
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or("could not construct midnight for the requested date")?;
    offset
        .from_local_datetime(&midnight)
        .single()
        .ok_or_else(|| "ambiguous local datetime".into())
}

fn build_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::new(&args.method)
        .with_asr_school(args.asr_method.into())
        .with_hijri_correction(args.hijri_correction);
    if let Some(degrees) = args.fajr_angle {
        settings = settings.with_fajr_angle(degrees)?;
    }
    if let Some(degrees) = args.isha_angle {
        settings = settings.with_isha_angle(degrees)?;
    }
    if let Some(minutes) = args.isha_interval {
        settings = settings.with_isha_interval(minutes)?;
    }
    Ok(settings)
}

fn run_forward(args: &Args, latitude: f64, longitude: f64) -> Result<()> {
    let instant = observation_instant(args.date, args.utc_offset)?;
    let settings = build_settings(args)?;
    let table = MethodTable::builtin();

    let result = compute_prayer_times(
        latitude,
        longitude,
        args.elevation,
        &instant,
        settings,
        table,
    )?;

    print_section_header("Location");
    println!("Latitude:  {} deg", latitude);
    println!("Longitude: {} deg", longitude);
    println!("Elevation: {} m", args.elevation);
    println!("Clock:     UTC{}", instant.offset());

    print_section_header("Date");
    println!("Gregorian: {}", instant.format("%A, %B %d, %Y"));
    println!("Hijri:     {}", result.hijri);
    println!(
        "           {} {}, {}",
        result.hijri.month_name_arabic(),
        result.hijri.day,
        result.hijri.year
    );

    print_section_header("Qibla");
    println!("{:.2} deg clockwise from true north", result.qibla);

    print_section_header("Configuration");
    let method_name = table
        .get(&args.method)
        .map(|m| m.name.as_str())
        .unwrap_or(&args.method);
    println!("Method: {} ({})", method_name, args.method.to_uppercase());
    println!("Asr:    {:?}", args.asr_method);
    if let Some(degrees) = args.fajr_angle {
        println!("Custom Fajr angle: {} deg", degrees);
    }
    if let Some(degrees) = args.isha_angle {
        println!("Custom Isha angle: {} deg", degrees);
    }
    if let Some(minutes) = args.isha_interval {
        println!("Custom Isha interval: {} min after Maghrib", minutes);
    }

    print_section_header("Prayer times");
    for (name, time) in result.times_rounded.entries() {
        println!(
            "{:8} {}    [{}]",
            name,
            time.format("%I:%M %p"),
            time.format("%H:%M")
        );
    }
    println!();
    Ok(())
}

fn run_reverse(args: &Args, latitude: f64, longitude: f64) -> Result<()> {
    let instant = observation_instant(args.date, args.utc_offset)?;
    let date = instant.date_naive();
    let offset = *instant.offset();

    let at = |time: NaiveTime| -> Result<DateTime<FixedOffset>> {
        offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .ok_or_else(|| "ambiguous local datetime".into())
    };
    // requires_all on --reverse guarantees these are present
    let fajr = at(args.fajr.ok_or("missing --fajr")?)?;
    let maghrib = at(args.maghrib.ok_or("missing --maghrib")?)?;
    let isha = at(args.isha.ok_or("missing --isha")?)?;

    let solution = infer_angles(
        latitude,
        longitude,
        args.elevation,
        &instant,
        &fajr,
        &maghrib,
        &isha,
    )?;

    print_section_header("Observed times");
    println!("Fajr:    {}", fajr.format("%H:%M"));
    println!("Maghrib: {}", maghrib.format("%H:%M"));
    println!("Isha:    {}", isha.format("%H:%M"));

    print_section_header("Computed reference");
    println!("Solar noon: {}", solution.solar_noon.format("%H:%M:%S"));
    println!("Sunrise:    {}", solution.sunrise.format("%H:%M:%S"));
    if solution.high_latitude {
        println!("High-latitude location: angles use the proportional night rule");
    }

    print_section_header("Recovered parameters");
    println!(
        "Fajr angle:    {:.2} deg ({:?})",
        solution.fajr.angle, solution.fajr.method
    );
    println!(
        "Isha angle:    {:.2} deg ({:?})",
        solution.isha.angle, solution.isha.method
    );
    println!(
        "Isha interval: {:.1} min after Maghrib",
        solution.isha_interval_minutes
    );
    println!(
        "Plausible:     {}",
        if solution.valid { "yes" } else { "no" }
    );

    if !solution.warnings.is_empty() {
        print_section_header("Warnings");
        for warning in &solution.warnings {
            println!("- {}", warning);
        }
    }
    println!();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_methods {
        display_methods(MethodTable::builtin());
        return Ok(());
    }

    // clap enforces presence unless --list-methods was given
    let latitude = args.latitude.ok_or("latitude is required")?;
    let longitude = args.longitude.ok_or("longitude is required")?;

    if args.reverse {
        run_reverse(&args, latitude, longitude)
    } else {
        run_forward(&args, latitude, longitude)
    }
}
