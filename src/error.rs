use std::path::PathBuf;

use thiserror::Error;

use crate::model::period::Period;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("line {line}: empty value in column `{column}`")]
    MissingValue { line: u64, column: String },

    #[error("line {line}: invalid date `{value}`")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: invalid price `{value}` in column `{column}`")]
    InvalidPrice {
        line: u64,
        column: String,
        value: String,
    },

    #[error("{0} contains no data rows")]
    Empty(PathBuf),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("nothing to plot: the monthly series is empty")]
    EmptySeries,

    #[error("mean for {0} cannot be plotted")]
    Unplottable(Period),

    #[error("chart drawing failed: {0}")]
    Draw(String),

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
