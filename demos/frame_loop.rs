//! Drives a scheduler through three simulated seconds at 60 fps.
//!
//! `RUST_LOG=frametick=trace cargo run --example frame_loop` shows every fire.

use std::time::Duration;

use frametick::{
    Arg, BoxError, MethodTable, Owners, Schedule, Scheduler, TickBuilder, TickDecl, Tickable,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_micros(16_667);

struct Turret {
    name: &'static str,
    ammo: i64,
}

impl Tickable for Turret {
    fn ticks(&self) -> Vec<TickDecl> {
        vec![TickDecl::every_secs("scan", 0.5).after_secs(0.25)]
    }
}

fn turret_methods() -> MethodTable<Turret> {
    MethodTable::<Turret>::new()
        .with("scan", |turret, _, _| {
            info!(turret = turret.name, "scanning for targets");
            Ok(())
        })
        .with("reload", |turret, args, _| {
            let rounds = args
                .first()
                .and_then(Arg::as_int)
                .ok_or("reload needs a round count")?;
            turret.ammo += rounds;
            info!(turret = turret.name, ammo = turret.ammo, "reloaded");
            Ok(())
        })
}

fn main() -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut scheduler = Scheduler::with_resolver(turret_methods());
    let mut owners = Owners::new();

    let north = owners.spawn(Turret {
        name: "north",
        ammo: 0,
    });
    let south = owners.spawn(Turret {
        name: "south",
        ammo: 0,
    });
    scheduler.scan(&owners);

    TickBuilder::method_with_args(north, "reload", vec![Arg::from(6)])
        .interval_secs(1.0)
        .register(&mut scheduler, &owners)?;

    scheduler.register_callback(
        |frame| {
            info!("wave incoming");
            frame.register_callback(
                |_| {
                    info!("wave cleared");
                    Ok(())
                },
                Schedule::every_secs(0.75).once(),
            )?;
            Ok(())
        },
        Schedule::every_secs(1.0)
            .after_secs(0.5)
            .once()
            .label("wave"),
    )?;

    for frame in 0..180 {
        if frame == 90 {
            info!("south turret destroyed");
            owners.destroy(south);
        }

        let fired = scheduler.advance(FRAME, &mut owners)?;
        if fired > 0 {
            debug!(frame, fired, "frame done");
        }
    }

    for group in scheduler.inspect(&owners) {
        println!("{group:#}");
    }

    Ok(())
}
