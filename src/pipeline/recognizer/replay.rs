//! Recorded landmark streams, one JSON object per line:
//!
//! ```text
//! {"width":640,"height":480,"landmarks":[[0.41,0.52],[0.43,0.50],null,...]}
//! {"width":640,"height":480,"landmarks":null}
//! ```
//!
//! `landmarks` is indexed by landmark id; `null` entries are missing points and
//! a `null` list means no hand. A record may set `"error"` to simulate a
//! detector failure on that frame.

use std::{
    collections::VecDeque,
    io::BufRead,
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::HandDetector;
use crate::{
    error::Error,
    pipeline::FrameSource,
    types::{Frame, Landmark},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub landmarks: Option<Vec<Option<[f32; 2]>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplayRecord {
    fn detection(&self) -> Result<Option<Vec<Landmark>>> {
        if let Some(error) = &self.error {
            return Err(anyhow!(Error::DetectorUnavailable(error.clone())));
        }
        Ok(self.landmarks.as_ref().map(|points| {
            points
                .iter()
                .enumerate()
                .filter_map(|(id, point)| point.map(|[x, y]| Landmark::new(id, x, y)))
                .collect()
        }))
    }
}

pub fn parse_records<R: BufRead>(reader: R) -> crate::error::Result<Vec<ReplayRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|source| Error::Replay {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Splits a recording into a frame source and a detector that answer in lockstep.
pub fn open(path: &Path) -> Result<(ReplaySource, ReplayDetector)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open replay file {}", path.display()))?;
    let records = parse_records(std::io::BufReader::new(file))
        .with_context(|| format!("failed to parse replay file {}", path.display()))?;
    log::info!("replaying {} frames from {}", records.len(), path.display());
    Ok(from_records(records))
}

pub fn from_records(records: Vec<ReplayRecord>) -> (ReplaySource, ReplayDetector) {
    let sizes = records.iter().map(|r| (r.width, r.height)).collect();
    (
        ReplaySource { sizes },
        ReplayDetector {
            records: records.into(),
        },
    )
}

pub struct ReplaySource {
    sizes: VecDeque<(u32, u32)>,
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self
            .sizes
            .pop_front()
            .map(|(width, height)| Frame::blank(width, height)))
    }
}

pub struct ReplayDetector {
    records: VecDeque<ReplayRecord>,
}

impl HandDetector for ReplayDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Option<Vec<Landmark>>> {
        let record = self
            .records
            .pop_front()
            .ok_or_else(|| anyhow!("replay exhausted before the frame source"))?;
        record.detection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_and_skips_comments() {
        let input = "# recorded at 640x480\n\
                     {\"width\":640,\"height\":480,\"landmarks\":[[0.1,0.2],null,[0.3,0.4]]}\n\
                     \n\
                     {\"width\":640,\"height\":480,\"landmarks\":null}\n";
        let records = parse_records(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].landmarks, None);

        let landmarks = records[0].detection().unwrap().unwrap();
        assert_eq!(
            landmarks,
            vec![Landmark::new(0, 0.1, 0.2), Landmark::new(2, 0.3, 0.4)]
        );
    }

    #[test]
    fn reports_line_of_bad_record() {
        let input = "{\"width\":1,\"height\":1}\n{\"width\":\"wide\"}\n";
        let err = parse_records(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Replay { line: 2, .. }));
    }

    #[test]
    fn error_records_fail_detection() {
        let (mut source, mut detector) = from_records(vec![ReplayRecord {
            width: 10,
            height: 10,
            landmarks: None,
            error: Some("model crashed".to_string()),
        }]);
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!((frame.width, frame.height), (10, 10));
        assert!(detector.detect(&frame).is_err());
        assert!(source.next_frame().unwrap().is_none());
    }
}
