// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end keyboard detection: lines → hypotheses → rectification →
// scoring → selection.

use image::{DynamicImage, GrayImage, RgbImage};
use keybed_core::config::DetectorConfig;
use keybed_core::error::{KeybedError, Result};
use keybed_core::{CandidateScore, Line, Quadrilateral};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::hypothesis::{generate_hypotheses, hypothesis_count};
use crate::lines::LineExtractor;
use crate::rectify::{PerspectiveRectifier, RectifiedCandidate};
use crate::scoring::{BlackKeyCounter, BlobKeyCounter, CandidateScorer};
use crate::select::Selection;

/// Receives intermediate results for visualisation or debugging.
///
/// Every method defaults to doing nothing; detection results never depend on
/// what a sink does.
pub trait DiagnosticSink {
    fn on_edge_map(&self, _edges: &GrayImage) {}

    fn on_lines(&self, _working: &RgbImage, _lines: &[Line]) {}

    fn on_best(&self, _candidate: &RectifiedCandidate) {}
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {}

/// Per-frame summary of what the pipeline saw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionReport {
    pub line_count: usize,
    /// Angular resolution the lines came from; `None` when no lines were found.
    pub theta_step_deg: Option<f32>,
    pub attempts: u32,
    pub hypothesis_count: usize,
    pub degenerate_count: usize,
    pub not_keyboard_count: usize,
    pub scored_count: usize,
    pub best_score: Option<CandidateScore>,
}

/// Result of [`KeyboardDetector::detect`].
#[derive(Debug, Clone)]
pub struct KeyboardDetection {
    pub best: Option<RectifiedCandidate>,
    pub report: DetectionReport,
    /// Frame height over working-image height.
    pub frame_ratio: f32,
}

impl KeyboardDetection {
    pub fn is_keyboard_detected(&self) -> bool {
        self.best.is_some()
    }

    pub fn best(&self) -> Option<&RectifiedCandidate> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<RectifiedCandidate> {
        self.best
    }

    /// Corners of the winning quadrilateral in original frame coordinates.
    pub fn frame_corners(&self) -> Option<Quadrilateral> {
        self.best
            .as_ref()
            .map(|candidate| candidate.source().scaled(self.frame_ratio))
    }
}

/// The full detection pipeline.
///
/// ```no_run
/// use keybed_vision::KeyboardDetector;
///
/// let frame = image::open("piano.jpg").unwrap();
/// let detection = KeyboardDetector::default().detect_dynamic(&frame).unwrap();
/// if let Some(best) = detection.best() {
///     println!("{:?} at {:?}", best.score(), detection.frame_corners());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct KeyboardDetector<C = BlobKeyCounter> {
    config: DetectorConfig,
    extractor: LineExtractor,
    rectifier: PerspectiveRectifier,
    scorer: CandidateScorer<C>,
}

impl KeyboardDetector<BlobKeyCounter> {
    /// Detector with the built-in connected-component key counter.
    pub fn new(config: DetectorConfig) -> Result<Self> {
        let counter = BlobKeyCounter::new(&config.scoring);
        Self::with_counter(config, counter)
    }
}

impl Default for KeyboardDetector<BlobKeyCounter> {
    fn default() -> Self {
        // DetectorConfig::default() always validates.
        let config = DetectorConfig::default();
        let counter = BlobKeyCounter::new(&config.scoring);
        Self::assemble(config, counter)
    }
}

impl<C: BlackKeyCounter> KeyboardDetector<C> {
    /// Detector with a caller-supplied black-key counter.
    pub fn with_counter(config: DetectorConfig, counter: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, counter))
    }

    /// Builds every stage from an already validated `config`.
    fn assemble(config: DetectorConfig, counter: C) -> Self {
        Self {
            extractor: LineExtractor::new(config.lines.clone()),
            rectifier: PerspectiveRectifier::new(config.rectify.clone()),
            scorer: CandidateScorer::with_counter(config.scoring.clone(), counter),
            config,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn detect_dynamic(&self, frame: &DynamicImage) -> Result<KeyboardDetection> {
        self.detect(&frame.to_rgb8())
    }

    /// Find the most keyboard-like region of `frame`.
    ///
    /// "No keyboard detected" is a normal outcome (`best` is `None`); errors
    /// are reserved for invalid input such as an empty frame.
    pub fn detect(&self, frame: &RgbImage) -> Result<KeyboardDetection> {
        self.detect_with_sink(frame, &NoopSink)
    }

    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn detect_with_sink(
        &self,
        frame: &RgbImage,
        sink: &dyn DiagnosticSink,
    ) -> Result<KeyboardDetection> {
        let extraction = self.extractor.extract(frame)?;
        sink.on_edge_map(&extraction.edges);
        sink.on_lines(&extraction.working, &extraction.lines);

        let selection = self.evaluate_lines(&extraction.working, &extraction.lines)?;
        let tally = selection.tally();
        let best = selection.into_best();

        let report = DetectionReport {
            line_count: extraction.lines.len(),
            theta_step_deg: extraction.theta_step_deg,
            attempts: extraction.attempts,
            hypothesis_count: hypothesis_count(extraction.lines.len()),
            degenerate_count: tally.degenerate,
            not_keyboard_count: tally.not_keyboard,
            scored_count: tally.scored,
            best_score: best.as_ref().and_then(RectifiedCandidate::score),
        };

        match &best {
            Some(candidate) => {
                sink.on_best(candidate);
                info!(
                    width = candidate.width(),
                    height = candidate.height(),
                    score = report.best_score.map(|s| s.value()).unwrap_or_default(),
                    "Keyboard detected"
                );
            }
            None => warn!(
                line_count = report.line_count,
                hypotheses = report.hypothesis_count,
                "No keyboard detected"
            ),
        }

        Ok(KeyboardDetection {
            best,
            report,
            frame_ratio: frame.height() as f32 / extraction.working.height() as f32,
        })
    }

    /// Pair, rectify, score, and select over `lines` in `working` coordinates.
    pub fn evaluate_lines(&self, working: &RgbImage, lines: &[Line]) -> Result<Selection> {
        if working.width() == 0 || working.height() == 0 {
            return Err(KeybedError::InvalidFrame(format!(
                "working image must be non-empty, got {}x{}",
                working.width(),
                working.height()
            )));
        }

        let selection = self.select(working, lines)?;
        let tally = selection.tally();
        info!(
            hypotheses = tally.evaluated(),
            degenerate = tally.degenerate,
            not_keyboard = tally.not_keyboard,
            scored = tally.scored,
            "Hypotheses evaluated"
        );
        Ok(selection)
    }

    /// Rectify and score one hypothesis; `None` when it is degenerate.
    fn evaluate(&self, working: &RgbImage, quad: &Quadrilateral) -> Result<Option<RectifiedCandidate>> {
        let Some(mut candidate) = self.rectifier.rectify(working, quad)? else {
            return Ok(None);
        };
        let score = self.scorer.score_in_place(&mut candidate);
        debug!(
            width = candidate.width(),
            height = candidate.height(),
            %score,
            "Hypothesis scored"
        );
        Ok(Some(candidate))
    }

    #[cfg(feature = "parallel")]
    fn select(&self, working: &RgbImage, lines: &[Line]) -> Result<Selection> {
        use rayon::prelude::*;

        generate_hypotheses(lines)
            .enumerate()
            .par_bridge()
            .try_fold(Selection::new, |mut selection, (index, quad)| -> Result<Selection> {
                selection.observe(index, self.evaluate(working, &quad)?);
                Ok(selection)
            })
            .try_reduce(Selection::new, |a, b| Ok(a.merge(b)))
    }

    #[cfg(not(feature = "parallel"))]
    fn select(&self, working: &RgbImage, lines: &[Line]) -> Result<Selection> {
        generate_hypotheses(lines)
            .enumerate()
            .try_fold(Selection::new(), |mut selection, (index, quad)| -> Result<Selection> {
                selection.observe(index, self.evaluate(working, &quad)?);
                Ok(selection)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use keybed_core::Point;
    use std::cell::Cell;

    fn horizontal(y: f32, width: u32) -> Line {
        Line::new(
            Point::new(0.0, y),
            Point::new(width as f32 - 1.0, y),
            y,
            90f32.to_radians(),
        )
    }

    #[derive(Default)]
    struct CountingSink {
        edge_maps: Cell<usize>,
        line_sets: Cell<usize>,
        bests: Cell<usize>,
    }

    impl DiagnosticSink for CountingSink {
        fn on_edge_map(&self, _edges: &GrayImage) {
            self.edge_maps.set(self.edge_maps.get() + 1);
        }

        fn on_lines(&self, _working: &RgbImage, _lines: &[Line]) {
            self.line_sets.set(self.line_sets.get() + 1);
        }

        fn on_best(&self, _candidate: &RectifiedCandidate) {
            self.bests.set(self.bests.get() + 1);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = DetectorConfig::default();
        config.scoring.blur_sigma = 0.0;
        assert!(matches!(
            KeyboardDetector::new(config),
            Err(KeybedError::InvalidConfig(_))
        ));
    }

    #[test]
    fn default_detector_matches_validated_construction() {
        assert!(DetectorConfig::default().validate().is_ok());
        let default = KeyboardDetector::default();
        let validated = KeyboardDetector::new(DetectorConfig::default()).unwrap();
        assert_eq!(default.config(), validated.config());
        assert_eq!(default.extractor.config(), validated.extractor.config());
        assert_eq!(default.scorer.config(), validated.scorer.config());
    }

    #[test]
    fn empty_frame_is_an_error() {
        let err = KeyboardDetector::default().detect(&RgbImage::new(0, 0)).unwrap_err();
        assert!(matches!(err, KeybedError::InvalidFrame(_)));
    }

    #[test]
    fn no_lines_no_hypotheses() {
        let working = RgbImage::from_pixel(100, 80, Rgb([200, 200, 200]));
        let selection = KeyboardDetector::default().evaluate_lines(&working, &[]).unwrap();
        assert!(selection.best().is_none());
        assert_eq!(selection.tally().evaluated(), 0);
    }

    #[test]
    fn close_lines_are_degenerate() {
        let working = RgbImage::from_pixel(200, 100, Rgb([200, 200, 200]));
        let lines = [horizontal(40.0, 200), horizontal(45.0, 200)];
        let selection = KeyboardDetector::default().evaluate_lines(&working, &lines).unwrap();
        assert!(selection.best().is_none());
        assert_eq!(selection.tally().degenerate, 1);
    }

    #[test]
    fn custom_counter_decides_the_score() {
        // Key band darker than the front band, so the counter is consulted.
        let working = RgbImage::from_fn(200, 120, |x, y| {
            if (20..60).contains(&y) && (x / 10) % 3 == 0 {
                Rgb([20, 20, 20])
            } else if y < 70 {
                Rgb([230, 230, 230])
            } else {
                Rgb([150, 150, 150])
            }
        });
        let detector =
            KeyboardDetector::with_counter(DetectorConfig::default(), |_: &RgbImage| 52u32).unwrap();
        let lines = [horizontal(10.0, 200), horizontal(100.0, 200)];
        let selection = detector.evaluate_lines(&working, &lines).unwrap();
        let (index, best) = selection.best().unwrap();
        assert_eq!(index, 0);
        assert_eq!(best.score(), Some(CandidateScore::BlackKeys(52)));
    }

    #[test]
    fn non_finite_lines_fail_fast() {
        let working = RgbImage::from_pixel(200, 100, Rgb([200, 200, 200]));
        let lines = [horizontal(f32::NAN, 200), horizontal(60.0, 200)];
        let err = KeyboardDetector::default().evaluate_lines(&working, &lines).unwrap_err();
        assert!(matches!(err, KeybedError::InvalidQuadrilateral(_)));
    }

    #[test]
    fn sink_sees_every_stage_of_a_blank_frame() {
        let sink = CountingSink::default();
        let frame = RgbImage::from_pixel(120, 90, Rgb([90, 90, 90]));
        let detection = KeyboardDetector::default().detect_with_sink(&frame, &sink).unwrap();
        assert!(!detection.is_keyboard_detected());
        assert_eq!(sink.edge_maps.get(), 1);
        assert_eq!(sink.line_sets.get(), 1);
        assert_eq!(sink.bests.get(), 0);
    }

    #[test]
    fn frame_corners_undo_the_downscale() {
        let source = Quadrilateral::from_corners([
            Point::new(10.0, 20.0),
            Point::new(110.0, 20.0),
            Point::new(110.0, 70.0),
            Point::new(10.0, 70.0),
        ]);
        let detection = KeyboardDetection {
            best: Some(RectifiedCandidate::new(RgbImage::new(100, 50), source)),
            report: DetectionReport::default(),
            frame_ratio: 2.0,
        };
        let corners = detection.frame_corners().unwrap();
        assert_eq!(corners.top_left(), Point::new(20.0, 40.0));
        assert_eq!(corners.bottom_right(), Point::new(220.0, 140.0));
    }

    #[test]
    fn report_serializes() {
        let report = DetectionReport {
            line_count: 3,
            theta_step_deg: Some(2.0),
            attempts: 10,
            hypothesis_count: 3,
            degenerate_count: 1,
            not_keyboard_count: 1,
            scored_count: 1,
            best_score: Some(CandidateScore::BlackKeys(7)),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["hypothesis_count"], 3);
        assert_eq!(json["best_score"]["BlackKeys"], 7);
    }
}
