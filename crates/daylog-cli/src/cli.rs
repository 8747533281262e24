//! Command-line definitions for daylog.

use clap::{Args, Parser, Subcommand};

use daylog_core::VERSION;

/// daylog - a local, offline-first daily health log
#[derive(Parser)]
#[command(name = "daylog")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the log store
    #[arg(short, long, global = true, env = "DAYLOG_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Path to the config file
    #[arg(long, global = true, env = "DAYLOG_CONFIG")]
    pub config: Option<String>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the record for a date
    Show(ShowArgs),

    /// Update fields on a date's record
    Log(LogArgs),

    /// Edit a date's record interactively, with autosave
    Edit(EditArgs),

    /// List stored dates
    List(ListArgs),

    /// Aggregate stats over the store
    Summary,

    /// Export all records
    Export(ExportArgs),

    /// Import records from a file
    Import(ImportArgs),

    /// Delete all records in an inclusive date range
    ClearRange(ClearRangeArgs),

    /// Delete every record
    ClearAll(ClearAllArgs),
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Date to show (YYYY-MM-DD, default today)
    #[arg(value_name = "DATE")]
    pub date: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `log` command
#[derive(Args)]
pub struct LogArgs {
    /// Date to update (YYYY-MM-DD, default today)
    #[arg(value_name = "DATE")]
    pub date: Option<String>,

    /// Mark a supplement as taken (repeatable)
    #[arg(long, value_name = "ID")]
    pub supplement: Vec<String>,

    /// Mark a supplement as not taken (repeatable)
    #[arg(long, value_name = "ID")]
    pub no_supplement: Vec<String>,

    /// Mark an exercise as done (repeatable)
    #[arg(long, value_name = "ID")]
    pub exercise: Vec<String>,

    /// Mark an exercise as not done (repeatable)
    #[arg(long, value_name = "ID")]
    pub no_exercise: Vec<String>,

    /// Set the custom vitamin name
    #[arg(long, value_name = "NAME")]
    pub custom_vitamin: Option<String>,

    /// Mark the custom vitamin as taken
    #[arg(long)]
    pub custom_vitamin_taken: bool,

    /// Mark the day as fasted
    #[arg(long)]
    pub fasted: bool,

    /// Mark the day as water-fasted
    #[arg(long)]
    pub water_fasted: bool,

    /// Fasting blood sugar (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub fasting_blood_sugar: Option<String>,

    /// Pre-dinner blood sugar (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub pre_dinner_sugar: Option<String>,

    /// Post-dinner blood sugar (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub post_dinner_sugar: Option<String>,

    /// Waist size (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub waist_size: Option<String>,

    /// Weight (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub weight: Option<String>,

    /// Body fat percentage (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub fat_percentage: Option<String>,

    /// Systolic blood pressure (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub bp_systolic: Option<String>,

    /// Diastolic blood pressure (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub bp_diastolic: Option<String>,

    /// Left grip strength (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub grip_left: Option<String>,

    /// Right grip strength (blank clears)
    #[arg(long, value_name = "VALUE")]
    pub grip_right: Option<String>,

    /// Breakfast time
    #[arg(long, value_name = "TIME")]
    pub breakfast_time: Option<String>,

    /// Breakfast description
    #[arg(long, value_name = "TEXT")]
    pub breakfast: Option<String>,

    /// Lunch time
    #[arg(long, value_name = "TIME")]
    pub lunch_time: Option<String>,

    /// Lunch description
    #[arg(long, value_name = "TEXT")]
    pub lunch: Option<String>,

    /// Dinner time
    #[arg(long, value_name = "TIME")]
    pub dinner_time: Option<String>,

    /// Dinner description
    #[arg(long, value_name = "TEXT")]
    pub dinner: Option<String>,

    /// Free-text notes for the day
    #[arg(long, value_name = "TEXT")]
    pub notes: Option<String>,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Date to edit (YYYY-MM-DD, default today)
    #[arg(value_name = "DATE")]
    pub date: Option<String>,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `export` command
#[derive(Args)]
pub struct ExportArgs {
    /// Output format (json, csv)
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Write to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<String>,
}

/// Arguments for the `import` command
#[derive(Args)]
pub struct ImportArgs {
    /// File to import
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Input format (json, csv; default inferred from the extension)
    #[arg(long)]
    pub format: Option<String>,

    /// Assign sequential dates to rows with no resolvable date
    #[arg(long)]
    pub auto_date: bool,
}

/// Arguments for the `clear-range` command
#[derive(Args)]
pub struct ClearRangeArgs {
    /// First date to delete (inclusive)
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Last date to delete (inclusive)
    #[arg(value_name = "TO")]
    pub to: String,
}

/// Arguments for the `clear-all` command
#[derive(Args)]
pub struct ClearAllArgs {
    /// Confirm deleting every record; without this the command refuses
    #[arg(long)]
    pub yes: bool,
}
