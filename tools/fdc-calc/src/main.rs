//! fdc-calc: command-line fire-direction calculator.
//!
//! Usage:
//!   fdc-calc mission --file missions/battery.toml
//!   fdc-calc solve --file missions/battery.toml --gun m777-1 --projectile m795 --target 4800,5200
//!   fdc-calc calibrate --p0 100,100 --p1 0,500 --p2 200,500 --known 1000,2000 --scale 1000
//!   fdc-calc grid 058/071

use std::path::PathBuf;
use std::process;

use serde::Serialize;

use fdc_ballistics::stages::solver::FireRequest;
use fdc_ballistics::{MissionFile, Workspace};
use fdc_core::error::Result;
use fdc_core::types::{Point2, TargetPoint};
use fdc_map::calibration::{calibrate_by_three_points, ControlPoint};
use fdc_map::grid::{format_grid_reference, parse_grid_reference, GridPrecision};
use fdc_patterns::aim_points::generate_aim_points;
use fdc_patterns::plan::build_fire_plan;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let rest = &args[2..];
    tracing::debug!(command = %args[1], "fdc-calc started");
    let compact = has_flag(rest, "--compact");
    let result = match args[1].as_str() {
        "mission" => cmd_mission(rest).and_then(|r| emit(&r, compact)),
        "aim-points" => cmd_aim_points(rest).and_then(|r| emit(&r, compact)),
        "solve" => cmd_solve(rest).and_then(|r| emit(&r, compact)),
        "calibrate" => cmd_calibrate(rest).and_then(|r| emit(&r, compact)),
        "grid" => cmd_grid(rest).and_then(|r| emit(&r, compact)),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "fdc-calc: artillery fire-direction calculator\n\
         \n\
         Commands:\n\
         \n\
         mission     Plan and solve the fire mission of a mission file\n\
         \n\
           --file <path>      Mission file (.toml or .json)\n\
         \n\
         aim-points  Print the fire plan of a mission file without solving\n\
         \n\
           --file <path>      Mission file (.toml or .json)\n\
         \n\
         solve       Solve one gun against one target\n\
         \n\
           --file <path>        Mission file with guns and projectiles\n\
           --gun <id>           Gun id\n\
           --projectile <id>    Projectile id\n\
           --target <x,y[,z]>   Target position (m); z is altitude\n\
         \n\
         calibrate   Derive a map calibration from three control points\n\
         \n\
           --p0 <x,y>         Pixel of the point with known coordinates\n\
           --p1 <x,y>         Ruler start pixel\n\
           --p2 <x,y>         Ruler end pixel\n\
           --known <x,y>      World coordinates of p0 (m)\n\
           --scale <m>        Ruler length (m)\n\
           --pixel <x,y>      Pixel to convert (optional)\n\
         \n\
         grid        Convert a grid reference, or a point with --point\n\
         \n\
           <ref>              Grid reference, e.g. 058/071\n\
           --point <x,y>      World point to format\n\
           --fine             Four-digit reference\n\
         \n\
         All commands print JSON on stdout; --compact disables pretty printing.\n\
         Log level is read from RUST_LOG.\n"
    );
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].as_str());
        }
    }
    None
}

fn parse_numbers(text: &str) -> Option<Vec<f64>> {
    text.split(',').map(|p| p.trim().parse().ok()).collect()
}

fn parse_pair(args: &[String], flag: &str) -> Option<(f64, f64)> {
    match parse_numbers(parse_value(args, flag)?)?.as_slice() {
        [x, y] => Some((*x, *y)),
        _ => None,
    }
}

fn require<T>(value: Option<T>, usage: &str) -> T {
    match value {
        Some(v) => v,
        None => {
            eprintln!("Error: {usage} is required");
            process::exit(1);
        }
    }
}

fn emit<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    let text = text.map_err(|e| fdc_core::error::FdcError::Config(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn load(args: &[String]) -> Result<(MissionFile, Workspace)> {
    let path = PathBuf::from(require(parse_value(args, "--file"), "--file <path>"));
    let file = MissionFile::load(&path)?;
    let workspace = file.build_workspace()?;
    Ok((file, workspace))
}

// --- Mission commands ---

fn cmd_mission(args: &[String]) -> Result<fdc_ballistics::MissionReport> {
    let (file, workspace) = load(args)?;
    let mission = file.resolve_mission(&workspace)?;
    let report = workspace.run_fire_mission(&mission);
    eprintln!(
        "{} shot(s) in {} phase(s), {} cleared to fire",
        report.shots.len(),
        report.plan.phases.len(),
        report.cleared_count()
    );
    Ok(report)
}

fn cmd_aim_points(args: &[String]) -> Result<fdc_patterns::plan::FirePlan> {
    let (file, workspace) = load(args)?;
    let mission = file.resolve_mission(&workspace)?;
    let points = generate_aim_points(&mission.fire_mode, mission.guns.len());
    Ok(build_fire_plan(points, &mission.control, mission.fire_mode.bearing()))
}

fn cmd_solve(args: &[String]) -> Result<fdc_core::solution::Solution> {
    let (_, workspace) = load(args)?;
    let gun_id = require(parse_value(args, "--gun"), "--gun <id>");
    let projectile_id = require(parse_value(args, "--projectile"), "--projectile <id>");
    let target = match require(parse_value(args, "--target").and_then(parse_numbers), "--target <x,y[,z]>")
        .as_slice()
    {
        [x, y] => TargetPoint::new(*x, *y),
        [x, y, z] => TargetPoint::with_z(*x, *y, *z),
        _ => {
            eprintln!("Error: --target takes two or three numbers");
            process::exit(1);
        }
    };

    let (gun, _) = workspace.resolve(gun_id, projectile_id)?;
    let request = FireRequest::toward(gun, &target);
    workspace.calculate_gun_solution(gun_id, projectile_id, &request)
}

// --- Map commands ---

#[derive(Serialize)]
struct CalibrationOutput {
    calibration: fdc_map::calibration::Calibration,
    pixel: Option<Point2>,
    world: Option<Point2>,
}

fn cmd_calibrate(args: &[String]) -> Result<CalibrationOutput> {
    let point = |flag: &str| {
        let (x, y) = require(parse_pair(args, flag), &format!("{flag} <x,y>"));
        ControlPoint::new(x, y)
    };
    let (p0, p1, p2) = (point("--p0"), point("--p1"), point("--p2"));
    let (kx, ky) = require(parse_pair(args, "--known"), "--known <x,y>");
    let scale: f64 = require(
        parse_value(args, "--scale").and_then(|s| s.parse().ok()),
        "--scale <m>",
    );

    let calibration = calibrate_by_three_points(p0, p1, p2, Point2::new(kx, ky), scale)?;
    let pixel = parse_pair(args, "--pixel").map(|(x, y)| Point2::new(x, y));
    let world = pixel.map(|p| calibration.pixel_to_world(p));
    Ok(CalibrationOutput {
        calibration,
        pixel,
        world,
    })
}

#[derive(Serialize)]
struct GridOutput {
    reference: String,
    point: Point2,
}

fn cmd_grid(args: &[String]) -> Result<GridOutput> {
    if let Some((x, y)) = parse_pair(args, "--point") {
        let precision = if has_flag(args, "--fine") {
            GridPrecision::Fine
        } else {
            GridPrecision::Coarse
        };
        let point = Point2::new(x, y);
        return Ok(GridOutput {
            reference: format_grid_reference(point, precision)?,
            point,
        });
    }

    let reference = require(
        args.iter().find(|a| !a.starts_with("--")).cloned(),
        "<ref> or --point <x,y>",
    );
    let point = parse_grid_reference(&reference)?;
    Ok(GridOutput { reference, point })
}
