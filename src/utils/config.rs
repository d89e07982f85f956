#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use clap::Parser;
use lazy_static::lazy_static;
use log::{info, error, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;
use std::{env, fs, io::ErrorKind, path::Path};

// QAPI Utilities
use crate::utils::{bug_utils, errors::Errors};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_QAPI_ROOT_DIR    : &str = "QAPI_ROOT_DIR";
const DEFAULT_ROOT_DIR     : &str = "~/.qapi";
const CONFIG_DIR           : &str = "/config";
const LOG4RS_CONFIG_FILE   : &str = "/log4rs.yml"; // relative to config dir
const QAPI_CONFIG_FILE     : &str = "/qapi.toml";  // relative to config dir

// Networking.
const DEFAULT_HTTP_ADDR    : &str = "http://localhost";
const DEFAULT_HTTP_PORT    : u16  = 8080;

// Used when no log4rs configuration file exists.
const DEFAULT_LOG_PATTERN  : &str = "{d(%Y-%m-%dT%H:%M:%S%.3f)} {h({l})} {t} - {m}{n}";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref QAPI_ARGS: QapiArgs = init_qapi_args();
}

// Calculate the data directories BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref QAPI_DIRS: QapiDirs = init_qapi_dirs();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// QapiDirs:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct QapiDirs {
    pub root_dir: String,
    pub config_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// QapiArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, Parser)]
#[command(name = "qapi_server", about = "Command line arguments for the QAPI bug server.")]
pub struct QapiArgs {
    /// Specify the server's root data directory.
    /// 
    /// The root directory is calculated using the following priority order:
    /// 
    ///   1. If set, the value of the QAPI_ROOT_DIR environment,
    /// 
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    /// 
    ///   3. Otherwise, ~/.qapi
    #[arg(short, long)]
    pub root_dir: Option<String>,

    /// Listen on this port instead of the configured one.
    #[arg(short, long)]
    pub port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub qapi_args: &'static QapiArgs,
    pub qapi_dirs: &'static QapiDirs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Parse a toml document.  Missing keys take their default values.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "QAPI Bugs Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_qapi_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_qapi_args() -> QapiArgs {
    let args = QapiArgs::parse();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// init_qapi_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories.  Nothing is created; missing
 * directories simply mean default values are used.
 */
fn init_qapi_dirs() -> QapiDirs {
    let root_dir = get_root_dir();
    let config_dir = root_dir.clone() + CONFIG_DIR;
    QapiDirs {root_dir, config_dir}
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_QAPI_ROOT_DIR).unwrap_or_else(
        |_| {
            match QAPI_ARGS.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    // Canonicalize the path.
    bug_utils::get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
pub fn init_log() {
    // Prefer the configuration file when one is installed.
    let logconfig = init_log_config();
    if Path::new(&logconfig).is_file() {
        match log4rs::init_file(logconfig.clone(), Default::default()) {
            Ok(_) => (),
            Err(e) => {
                println!("{}", e);
                let s = format!("{}", Errors::Log4rsInitialization(logconfig));
                panic!("{}", s);
            },
        }
        info!("Log4rs initialized using: {}", logconfig);
        return;
    }

    // Fall back to console logging at info level.
    if let Err(e) = init_console_log() {
        println!("{}", e);
        panic!("{}", Errors::Log4rsInitialization("<console>".to_string()));
    }
    info!("Log4rs initialized with console defaults, {} not found.", logconfig);
}

// ---------------------------------------------------------------------------
// init_console_log:
// ---------------------------------------------------------------------------
fn init_console_log() -> Result<()> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
        .build();
    let config = log4rs::config::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// init_log_config:
// ---------------------------------------------------------------------------
fn init_log_config() -> String {
    QAPI_DIRS.config_dir.clone() + LOG4RS_CONFIG_FILE
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the 
 * config directory.  If the file does not exist, default values are used.
 * The --port command line argument always wins over the file.
 */
fn get_parms() -> Result<Parms> {
    // Get the config file path from its data directory.
    let config_file = QAPI_DIRS.config_dir.clone() + QAPI_CONFIG_FILE;
    
    // Read the configuration file.
    let config_file_abs = bug_utils::get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let (config_file, mut config) = match read_config(&config_file_abs)? {
        Some(c) => (config_file_abs, c),
        None => {
            info!("No configuration at {}. Using default values.", config_file);
            (Default::default(), Config::new())
        }
    };

    if let Some(port) = QAPI_ARGS.port {
        config.http_port = port;
    }

    Ok(Parms { config_file, config })
}

// ---------------------------------------------------------------------------
// read_config:
// ---------------------------------------------------------------------------
/** Read and parse a configuration file.  A missing file yields None; a file
 * that exists but cannot be read or parsed is an error.
 */
fn read_config(config_file: &str) -> Result<Option<Config>> {
    let contents = match fs::read_to_string(config_file) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::ReadingConfigFile(config_file.to_string()), 
                              Errors::IOError(e));
            error!("{}", msg);
            return Result::Err(anyhow!(msg));
        }
    };

    // Parse the toml configuration.
    match Config::from_toml(&contents) {
        Ok(c)  => Ok(Some(c)),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            Result::Err(anyhow!(msg))
        }
    }
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> RuntimeCtx {
    // The application aborts if the configuration is unusable.
    let parms = get_parms().expect("FAILED to read configuration file.");
    RuntimeCtx {parms, qapi_args: &QAPI_ARGS, qapi_dirs: &QAPI_DIRS}
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::new();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.http_addr, "http://localhost");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml("http_port = 9090\n").unwrap();
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.title, Config::default().title);
    }

    #[test]
    fn bad_toml_is_rejected() {
        assert!(Config::from_toml("http_port = \"not a port\"").is_err());
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let missing = env::temp_dir().join("qapi-no-such-dir").join("qapi.toml");
        assert!(read_config(missing.to_str().unwrap()).unwrap().is_none());
    }

    #[test]
    fn unreadable_config_file_is_an_error() {
        // A directory exists but cannot be read as a file.
        let dir = env::temp_dir();
        let err = read_config(dir.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Reading application configuration file"));
    }

    #[test]
    fn args_parse() {
        let args = QapiArgs::try_parse_from(["qapi_server", "--port", "3000", "-r", "/tmp/q"]).unwrap();
        assert_eq!(args.port, Some(3000));
        assert_eq!(args.root_dir.as_deref(), Some("/tmp/q"));
    }
}
