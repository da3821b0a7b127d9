use std::time::Instant;

/// What the update callback wants the loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Main application structure that drives the per-frame tick.
///
/// Runs headless at a fixed timestep; a windowed host would call the same
/// callback from its own event loop.
pub struct App {
    title: String,
    width: u32,
    height: u32,
    update_callback: Option<Box<dyn FnMut(u64, f32) -> Flow + 'static>>,
}

impl App {
    /// Create a new App with the specified title and dimensions
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            update_callback: None,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Set the callback that will be called each frame with the frame index
    /// and the timestep in seconds
    pub fn set_update_callback<F>(&mut self, callback: F)
    where
        F: FnMut(u64, f32) -> Flow + 'static,
    {
        self.update_callback = Some(Box::new(callback));
    }

    /// Run at most `frames` frames of `dt` seconds each. Returns the number of
    /// frames actually run.
    pub fn run_frames(&mut self, frames: u64, dt: f32) -> u64 {
        let Some(callback) = self.update_callback.as_mut() else {
            log::warn!("No update callback set for '{}', nothing to run", self.title);
            return 0;
        };

        let mut ran = 0;
        for frame in 0..frames {
            ran += 1;
            if callback(frame, dt) == Flow::Exit {
                log::info!("Exit requested at frame {}", frame);
                break;
            }
        }
        ran
    }

    /// Install the `env_logger` backend (`RUST_LOG` controls verbosity).
    /// Safe to call more than once; the first logger wins.
    pub fn init_logging() {
        let _ = env_logger::try_init();
    }

    /// Initialise logging and run the loop
    pub fn run(mut self, frames: u64, dt: f32) -> Result<u64, Box<dyn std::error::Error>> {
        Self::init_logging();

        if !(dt > 0.0) {
            return Err(format!("timestep must be positive, got {}", dt).into());
        }

        log::info!("Running '{}' ({}x{}) for up to {} frames", self.title, self.width, self.height, frames);
        let start = Instant::now();
        let ran = self.run_frames(frames, dt);
        log::info!(
            "Ran {} frames ({:.1}s simulated) in {:?}",
            ran,
            ran as f32 * dt,
            start.elapsed()
        );
        Ok(ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_runs_requested_frames() {
        let counter = Rc::new(Cell::new(0u64));
        let inner = Rc::clone(&counter);
        let mut app = App::new("test", 800, 600);
        app.set_update_callback(move |_, _| {
            inner.set(inner.get() + 1);
            Flow::Continue
        });
        assert_eq!(app.run_frames(10, 1.0 / 60.0), 10);
        assert_eq!(counter.get(), 10);
    }

    #[test]
    fn test_exit_stops_loop() {
        let mut app = App::new("test", 800, 600);
        app.set_update_callback(|frame, _| if frame == 4 { Flow::Exit } else { Flow::Continue });
        assert_eq!(app.run_frames(100, 0.1), 5);
    }

    #[test]
    fn test_without_callback() {
        let mut app = App::new("idle", 10, 10);
        assert_eq!(app.run_frames(3, 0.1), 0);
    }

    #[test]
    fn test_run_rejects_bad_timestep() {
        let app = App::new("bad", 10, 10);
        assert!(app.run(1, 0.0).is_err());
    }
}
