//! Arguments for the trustcheck utility

use clap::Parser;

use trustval::Variant;

/// Validate a certificate chain against a folder of trusted certificates
#[derive(Parser, Debug, Default)]
#[command(arg_required_else_help(true))]
#[clap(author, version, about, long_about = None)]
pub struct TrustcheckArgs {
    /// Full path of folder containing binary DER or PEM encoded trusted certificates or RFC 5914
    /// TrustAnchorChoice objects. Subfolders are searched.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub ta_folder: Option<String>,

    /// Full path and filename of YAML-formatted configuration file for log4rs logging mechanism.
    /// See <https://docs.rs/log4rs/latest/log4rs/> for details.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub logging_config: Option<String>,

    /// Full path and filename of JSON file containing validation settings.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub settings: Option<String>,

    /// Time to use for path validation expressed as the number of seconds since Unix epoch.
    /// Overrides any time of interest in the settings file. The current time is used when neither
    /// is given. Zero disables validity checks.
    #[clap(short = 'i', long, help_heading = "COMMON OPTIONS")]
    pub time_of_interest: Option<u64>,

    /// Full path and filename of a binary DER or PEM encoded certificate. Repeat to provide a
    /// chain, beginning with the end entity certificate.
    #[clap(short, long, help_heading = "VALIDATION")]
    pub chain: Vec<String>,

    /// Full path of folder containing binary DER or PEM encoded intermediate CA certificates made
    /// available to path building.
    #[clap(short = 'a', long, help_heading = "VALIDATION")]
    pub ca_folder: Option<String>,

    /// Validator variant, e.g., "tls server" or "plugin code signing".
    #[clap(short, long, default_value_t = Variant::Generic, help_heading = "VALIDATION")]
    pub variant: Variant,

    /// Log details of each trust anchor.
    #[clap(long, help_heading = "DIAGNOSTICS")]
    pub list_trust_anchors: bool,
}
