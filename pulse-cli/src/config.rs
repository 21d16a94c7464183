use anyhow::{Context, Result};
use clap::ValueEnum;
use pulse_ingest::DatasetKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub exports: ExportsSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Where the six exports live and what they are called.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportsSection {
    /// Directory holding the exports (default: current directory)
    pub data_dir: Option<PathBuf>,
    pub membership_sales: String,
    pub membership_sales_with_renewals: String,
    pub intro_sales: String,
    pub leads_customers: String,
    pub intro_conversions: String,
    pub payments: String,
}

impl Default for ExportsSection {
    fn default() -> Self {
        let name = |kind: DatasetKind| kind.default_file_name().to_string();
        Self {
            data_dir: None,
            membership_sales: name(DatasetKind::MembershipSales),
            membership_sales_with_renewals: name(DatasetKind::MembershipSalesWithRenewals),
            intro_sales: name(DatasetKind::IntroSales),
            leads_customers: name(DatasetKind::LeadsCustomers),
            intro_conversions: name(DatasetKind::IntroConversions),
            payments: name(DatasetKind::Payments),
        }
    }
}

impl ExportsSection {
    pub fn file_name(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::MembershipSales => &self.membership_sales,
            DatasetKind::MembershipSalesWithRenewals => &self.membership_sales_with_renewals,
            DatasetKind::IntroSales => &self.intro_sales,
            DatasetKind::LeadsCustomers => &self.leads_customers,
            DatasetKind::IntroConversions => &self.intro_conversions,
            DatasetKind::Payments => &self.payments,
        }
    }

    /// Full path of each export under `dir` (flag), else `data_dir`, else `.`.
    pub fn paths(&self, dir: Option<&Path>) -> Vec<(DatasetKind, PathBuf)> {
        let base = dir
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        DatasetKind::ALL
            .into_iter()
            .map(|kind| (kind, base.join(self.file_name(kind))))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
}

pub fn pulse_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".pulse"))
}

pub fn config_path(overridden: Option<&Path>) -> Result<PathBuf> {
    match overridden {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(pulse_home()?.join("pulse.toml")),
    }
}

pub fn load_config(overridden: Option<&Path>) -> Result<Config> {
    let p = config_path(overridden)?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config, overridden: Option<&Path>) -> Result<PathBuf> {
    let p = config_path(overridden)?;
    if let Some(dir) = p.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config(overridden: Option<&Path>) -> Result<()> {
    let p = config_path(overridden)?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default(), overridden)?;
    println!("Wrote {}", written.display());
    Ok(())
}
