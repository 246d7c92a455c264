use thiserror::Error;

/// Setup and configuration failures.
///
/// Routine runtime outcomes (target out of range, outside the sector, ...)
/// are never reported through this type; they are fields on the results.
#[derive(Error, Debug)]
pub enum FdcError {
    #[error("Gun not found: {0}")]
    GunNotFound(String),

    #[error("Projectile not found: {0}")]
    ProjectileNotFound(String),

    #[error("Projectile {projectile_id} is not linked to gun {gun_id}")]
    ProjectileNotLinked {
        gun_id: String,
        projectile_id: String,
    },

    #[error("Projectile {projectile_id} has no charge {level} ({variant})")]
    ChargeNotFound {
        projectile_id: String,
        level: u32,
        variant: String,
    },

    #[error("Range table must contain at least one row")]
    EmptyRangeTable,

    #[error("Invalid range table: {0}")]
    InvalidRangeTable(String),

    #[error("Invalid gun {id}: {reason}")]
    InvalidGun { id: String, reason: String },

    #[error("Invalid no-fire area {id}: {reason}")]
    InvalidNoFireArea { id: String, reason: String },

    #[error("Calibration ruler has zero pixel length")]
    DegenerateCalibration,

    #[error("Calibration scale must be finite and positive, got {0}")]
    InvalidScale(f64),

    #[error("Invalid grid reference: {0}")]
    InvalidGridReference(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FdcError>;
