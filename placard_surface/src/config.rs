// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Duration;

use placard::Color;

/// Options for turning a layout into pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Pixels per layout unit.
    pub scale: f64,
    /// Fill drawn before any content. Transparent when `None`.
    pub background: Option<Color>,
    /// Whether attachment placeholders are filled.
    pub draw_placeholders: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            draw_placeholders: true,
        }
    }
}

/// Behavior of a [`Surface`](crate::Surface).
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// Lay out and rasterize on the worker pool instead of inline.
    pub async_rendering: bool,
    /// Number of worker threads for pools built from this config.
    pub workers: usize,
    /// Cross-fade from the previous frame when new content is applied.
    pub fade_on_update: bool,
    /// Length of the cross-fade.
    pub fade_duration: Duration,
    /// Cross-fade when a highlight is pressed or released.
    pub fade_on_highlight: bool,
    /// Length of the highlight cross-fade.
    pub highlight_fade_duration: Duration,
    /// Drop the current frame as soon as an asynchronous request is made.
    pub clear_contents_before_async: bool,
    /// How frames are rasterized.
    pub render: RenderOptions,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            async_rendering: true,
            workers: default_workers(),
            fade_on_update: false,
            fade_duration: Duration::from_millis(200),
            fade_on_highlight: true,
            highlight_fade_duration: Duration::from_millis(150),
            clear_contents_before_async: false,
            render: RenderOptions::default(),
        }
    }
}

impl SurfaceConfig {
    /// Returns the default config with overrides from the environment.
    ///
    /// `PLACARD_ASYNC` turns asynchronous rendering off when set to `0`,
    /// `false` or `off`. `PLACARD_WORKERS` sets the worker count.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(enabled) = env_flag("PLACARD_ASYNC") {
            config.async_rendering = enabled;
        }
        if let Some(workers) = env_count("PLACARD_WORKERS") {
            config.workers = workers;
        }
        config
    }

    /// Sets whether rendering happens on the worker pool.
    pub fn async_rendering(mut self, enabled: bool) -> Self {
        self.async_rendering = enabled;
        self
    }

    /// Sets whether applied frames cross-fade from the previous one.
    pub fn fade_on_update(mut self, enabled: bool) -> Self {
        self.fade_on_update = enabled;
        self
    }

    /// Sets whether highlight changes cross-fade.
    pub fn fade_on_highlight(mut self, enabled: bool) -> Self {
        self.fade_on_highlight = enabled;
        self
    }

    /// Sets the raster options.
    pub fn render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get().min(4))
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    parse_flag(&value)
}

fn env_count(name: &str) -> Option<usize> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(count) if count > 0 => Some(count),
        _ => {
            log::warn!("ignoring {name}={value:?}, expected a positive number");
            None
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    if ["1", "true", "on", "yes"]
        .iter()
        .any(|x| value.eq_ignore_ascii_case(x))
    {
        Some(true)
    } else if ["0", "false", "off", "no"]
        .iter()
        .any(|x| value.eq_ignore_ascii_case(x))
    {
        Some(false)
    } else {
        log::warn!("ignoring unrecognized flag value {value:?}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn flags() {
        assert_eq!(parse_flag("OFF"), Some(false));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }
}
