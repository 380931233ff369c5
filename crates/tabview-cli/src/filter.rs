use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tabview_core::{
    FilterInput, FilterOption, SelectionTally, filter_options, lookup, partition_by_sort_key,
    select_all, select_none, select_only, selection_tally, toggle,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FilterOp {
    /// Flip membership of --key in --selected
    Toggle,
    /// Select only --key within --allowed
    Only,
    /// Add every --allowed key to --selected
    All,
    /// Remove every --allowed key from --selected
    None,
    /// Order --values with --allowed keys first
    Sort,
    /// Option states and tally for a filter list
    View,
}

#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Every value the filter lists
    #[arg(long, value_delimiter = ',')]
    values: Vec<String>,

    /// Values this filter may select
    #[arg(long, value_delimiter = ',')]
    allowed: Vec<String>,

    /// Values currently shown in the data
    #[arg(long, value_delimiter = ',')]
    shown: Vec<String>,

    /// Current selection
    #[arg(long, value_delimiter = ',')]
    selected: Vec<String>,

    /// Key for toggle/only
    #[arg(long)]
    key: Option<String>,

    /// Treat the whole filter as disabled
    #[arg(long)]
    disabled: bool,
}

impl FilterArgs {
    /// An explicitly empty list (`--selected ""`) parses as one empty key.
    fn without_blank_keys(&self) -> Self {
        Self {
            values: non_blank(&self.values),
            allowed: non_blank(&self.allowed),
            shown: non_blank(&self.shown),
            selected: non_blank(&self.selected),
            key: self.key.clone(),
            disabled: self.disabled,
        }
    }
}

fn non_blank(keys: &[String]) -> Vec<String> {
    keys.iter().filter(|k| !k.is_empty()).cloned().collect()
}

#[derive(Serialize)]
struct FilterView {
    options: Vec<FilterOption<String>>,
    tally: SelectionTally,
}

fn require_key(args: &FilterArgs, op: FilterOp) -> Result<&String> {
    match &args.key {
        Some(key) => Ok(key),
        None => bail!("--key is required for {op:?}"),
    }
}

pub fn run(op: FilterOp, args: &FilterArgs) -> Result<()> {
    let args = &args.without_blank_keys();
    let output = match op {
        FilterOp::Toggle => to_json(&toggle(&args.selected, require_key(args, op)?))?,
        FilterOp::Only => {
            let key = require_key(args, op)?;
            if !args.allowed.contains(key) {
                tracing::warn!("'{key}' is outside the allowed set");
            }
            to_json(&select_only(&args.selected, &args.allowed, key))?
        }
        FilterOp::All => to_json(&select_all(&args.selected, &args.allowed))?,
        FilterOp::None => to_json(&select_none(&args.selected, &args.allowed))?,
        FilterOp::Sort => {
            let allowed = lookup(&args.allowed);
            let sort_key = if args.disabled { None } else { Some(&allowed) };
            to_json(&partition_by_sort_key(&args.values, sort_key))?
        }
        FilterOp::View => {
            let options = filter_options(&FilterInput {
                values: &args.values,
                allowed: &args.allowed,
                shown: &args.shown,
                selected: &args.selected,
                disabled: args.disabled,
            });
            let tally = selection_tally(&args.selected, &args.allowed);
            serde_json::to_string_pretty(&FilterView { options, tally })
                .context("failed to serialize filter view")?
        }
    };
    println!("{output}");
    Ok(())
}

fn to_json(keys: &[String]) -> Result<String> {
    serde_json::to_string(keys).context("failed to serialize selection")
}
