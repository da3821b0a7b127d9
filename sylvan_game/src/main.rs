use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use sylvan_core::{App, Flow, RecordingSink};
use sylvan_game::{AvatarInput, WorldConfig, World};

const FRAME_DT: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u64 = 3600;

/// Headless walk: run right for two seconds with a jump in the middle, then
/// stand still for two seconds to recover energy.
fn scripted_input(frame: u64) -> AvatarInput {
    let phase = frame % 240;
    AvatarInput {
        left: false,
        right: phase < 120,
        jump: phase == 60,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    App::init_logging();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    let frames = match args.next() {
        Some(n) => n.parse()?,
        None => DEFAULT_FRAMES,
    };

    let world = Rc::new(RefCell::new(World::new(config.clone(), RecordingSink::new())?));

    let mut app = App::new(
        "Sylvan",
        config.window_width as u32,
        config.window_height as u32,
    );

    let frame_world = Rc::clone(&world);
    let mut jumps = 0u64;
    let mut eaten = 0usize;
    app.set_update_callback(move |frame, dt| {
        let mut world = frame_world.borrow_mut();
        let report = world.tick(dt, scripted_input(frame));
        if report.jumped {
            jumps += 1;
            log::info!("Jump #{} reached {} trees", jumps, report.trees_notified);
        }
        eaten += report.fruit_eaten;

        if frame % 600 == 0 {
            let avatar = world.avatar();
            log::info!(
                "t={:.1}s avatar x={:.0} energy={:.1} state={} fruit eaten={}",
                world.time(),
                avatar.position.x,
                avatar.energy(),
                avatar.state().clip(),
                eaten
            );
        }
        Flow::Continue
    });

    let ran = app.run(frames, FRAME_DT)?;

    let world = world.borrow();
    let (loaded, loading) = world.chunks().get_stats();
    log::info!(
        "Finished after {} frames: {} objects placed, {} trees live, {} chunks loaded ({} pending)",
        ran,
        world.sink().len(),
        world.trees().count(),
        loaded,
        loading
    );
    Ok(())
}
