//! Output surfaces the session drives: the video player and the map.
//!
//! A front end implements these over its real widgets. The logging
//! implementations here back the terminal front end and the tests.

use tracing::{debug, info};

use super::sync::MapView;

/// The video element. Only the session seeks or starts playback.
pub trait VideoSurface: Send {
    fn load(&mut self, url: Option<&str>);
    fn seek(&mut self, secs: f64);
    fn play(&mut self);
    fn position(&self) -> f64;
    fn is_playing(&self) -> bool;
}

/// The map widget. Only the session changes its view.
pub trait MapSurface: Send {
    fn set_view(&mut self, view: MapView);
    fn view(&self) -> MapView;
}

/// Video stand-in that records what it was asked to do.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoggedVideo {
    pub url: Option<String>,
    pub position: f64,
    pub playing: bool,
    pub seeks: Vec<f64>,
}

impl LoggedVideo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoSurface for LoggedVideo {
    fn load(&mut self, url: Option<&str>) {
        info!(url = url.unwrap_or("<none>"), "Video source");
        self.url = url.map(str::to_string);
        self.position = 0.0;
        self.playing = false;
        self.seeks.clear();
    }

    fn seek(&mut self, secs: f64) {
        info!(position_secs = secs, "Video seek");
        self.position = secs;
        self.seeks.push(secs);
    }

    fn play(&mut self) {
        debug!(position_secs = self.position, "Video play");
        self.playing = true;
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Map stand-in that keeps the current view and a history of moves.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoggedMap {
    pub current: MapView,
    pub moves: usize,
}

impl LoggedMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapSurface for LoggedMap {
    fn set_view(&mut self, view: MapView) {
        info!(center = %view.center, zoom = view.zoom, "Map view");
        self.current = view;
        self.moves += 1;
    }

    fn view(&self) -> MapView {
        self.current
    }
}
