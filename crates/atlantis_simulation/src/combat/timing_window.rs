//! Timing window ("bloom") engine.
//!
//! Одно активное окно на актора. Progress растёт линейно `dt / duration`,
//! scale = lerp(start_scale, end_scale, progress). Spark успешен iff окно
//! активно и `progress >= critical_threshold` (сравнение строго `>=`).
//!
//! Gameplay close (spark) и visual fade разделены: после spark окно
//! неактивно, но bloom продолжает сжиматься до progress = 1.

use serde::{Deserialize, Serialize};

use super::error::ComboError;
use crate::logger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingWindowConfig {
    /// Window length when no clip duration is available (seconds)
    pub default_duration: f32,
    /// Progress at which a spark starts to succeed
    pub critical_threshold: f32,
    pub min_duration: f32,
    pub max_duration: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    /// Spark visual hides itself after this long
    pub spark_visible_duration: f32,
    /// "Getting closer" diagnostic range below the threshold
    pub near_miss_margin: f32,
}

impl Default for TimingWindowConfig {
    fn default() -> Self {
        Self {
            default_duration: 0.8,
            critical_threshold: 0.4,
            min_duration: 0.5,
            max_duration: 10.0,
            start_scale: 1.0,
            end_scale: 0.2,
            spark_visible_duration: 0.5,
            near_miss_margin: 0.1,
        }
    }
}

/// Result of [`TimingWindowEngine::tick`] when the countdown completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Progress reached 1 while the window was still active (no spark)
    TimedOut,
    /// Visual countdown finished after a spark already closed the window
    FadeFinished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SparkAttempt {
    Inactive,
    TooEarly { progress: f32 },
    Triggered { progress: f32 },
    /// Spark visual still showing: counts as success, cue not re-fired
    AlreadyShowing,
}

impl SparkAttempt {
    pub fn is_success(&self) -> bool {
        matches!(self, SparkAttempt::Triggered { .. } | SparkAttempt::AlreadyShowing)
    }
}

#[derive(Debug, Clone)]
pub struct TimingWindowEngine {
    config: TimingWindowConfig,
    active: bool,
    animating: bool,
    bloom_visible: bool,
    spark_visible: bool,
    spark_remaining: f32,
    progress: f32,
    scale: f32,
    duration: f32,
}

impl Default for TimingWindowEngine {
    fn default() -> Self {
        Self::new(TimingWindowConfig::default())
    }
}

impl TimingWindowEngine {
    pub fn new(config: TimingWindowConfig) -> Self {
        let scale = config.start_scale;
        let duration = config.default_duration;
        Self {
            config,
            active: false,
            animating: false,
            bloom_visible: false,
            spark_visible: false,
            spark_remaining: 0.0,
            progress: 0.0,
            scale,
            duration,
        }
    }

    /// Open a window sized to `duration` (clamped to `[min, max]`).
    ///
    /// Non-finite or non-positive durations fall back to `default_duration`.
    /// Returns the effective duration.
    pub fn open(&mut self, duration: f32) -> Result<f32, ComboError> {
        if self.active {
            logger::log_warning(&format!(
                "⏱️ TimingWindow: open rejected, window already active (progress {:.3})",
                self.progress
            ));
            return Err(ComboError::WindowAlreadyOpen {
                progress: self.progress,
            });
        }

        let requested = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            self.config.default_duration
        };
        let effective = requested.clamp(self.config.min_duration, self.config.max_duration);

        self.active = true;
        self.animating = true;
        self.bloom_visible = true;
        self.spark_visible = false;
        self.spark_remaining = 0.0;
        self.progress = 0.0;
        self.scale = self.config.start_scale;
        self.duration = effective;

        logger::log(&format!(
            "⏱️ TimingWindow: opened ({:.3}s, critical at {:.2})",
            effective, self.config.critical_threshold
        ));
        Ok(effective)
    }

    /// Advance the countdown by `delta` seconds.
    pub fn tick(&mut self, delta: f32) -> Option<WindowEvent> {
        if self.spark_visible {
            self.spark_remaining -= delta;
            if self.spark_remaining <= 0.0 {
                self.spark_visible = false;
                self.spark_remaining = 0.0;
            }
        }

        if !self.animating {
            return None;
        }

        self.progress = (self.progress + delta / self.duration).min(1.0);
        self.scale =
            self.config.start_scale + (self.config.end_scale - self.config.start_scale) * self.progress;

        if self.progress < 1.0 {
            return None;
        }

        self.animating = false;
        self.bloom_visible = false;

        if self.active {
            self.active = false;
            logger::log("⏱️ TimingWindow: timed out without spark");
            Some(WindowEvent::TimedOut)
        } else {
            Some(WindowEvent::FadeFinished)
        }
    }

    pub fn try_trigger_spark(&mut self) -> SparkAttempt {
        if self.spark_visible {
            return SparkAttempt::AlreadyShowing;
        }

        if !self.active {
            return SparkAttempt::Inactive;
        }

        let threshold = self.config.critical_threshold;
        if self.progress < threshold {
            if threshold - self.progress <= self.config.near_miss_margin {
                logger::log(&format!(
                    "✨ Spark: getting closer ({:.3} / {:.2})",
                    self.progress, threshold
                ));
            } else {
                logger::log(&format!(
                    "✨ Spark: too early ({:.3} / {:.2})",
                    self.progress, threshold
                ));
            }
            return SparkAttempt::TooEarly {
                progress: self.progress,
            };
        }

        // gameplay close; bloom keeps shrinking
        self.active = false;
        self.spark_visible = true;
        self.spark_remaining = self.config.spark_visible_duration;

        logger::log_info(&format!("✨ Spark triggered at progress {:.3}", self.progress));
        SparkAttempt::Triggered {
            progress: self.progress,
        }
    }

    /// Gameplay close. Bloom fade and spark cue run out on their own.
    pub fn close(&mut self) {
        if self.active {
            logger::log(&format!(
                "⏱️ TimingWindow: closed at progress {:.3}",
                self.progress
            ));
        }
        self.active = false;
    }

    /// Cosmetic hide; ignored while the gameplay window is still open.
    pub fn hide_bloom_if_closed(&mut self) -> bool {
        if self.active || !self.bloom_visible {
            return false;
        }
        self.bloom_visible = false;
        self.animating = false;
        true
    }

    /// Informational notification from the presentation layer.
    ///
    /// Never closes an active window.
    pub fn notify_closed_externally(&mut self) -> bool {
        if self.active {
            logger::log(&format!(
                "⏱️ TimingWindow: external close ignored, still active (progress {:.3})",
                self.progress
            ));
            return false;
        }
        self.hide_bloom_if_closed()
    }

    pub fn is_open(&self) -> bool {
        self.active
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_bloom_visible(&self) -> bool {
        self.bloom_visible
    }

    pub fn is_spark_visible(&self) -> bool {
        self.spark_visible
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn config(&self) -> &TimingWindowConfig {
        &self.config
    }
}
