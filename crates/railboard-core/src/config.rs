//! Pipeline configuration knobs.
//!
//! Everything is optional with safe defaults; the CLI layer deserializes
//! this from its config file and applies flag overrides.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the report pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker count for the per-run fetch pool.
    pub run_workers: usize,
    /// Hard ceiling on the per-run fetch pool, whatever `run_workers` says.
    pub run_worker_ceiling: usize,
    /// Worker count for the per-test attachment-metadata pool.
    pub attachment_workers: usize,
    /// Page size for paginated list endpoints.
    pub page_size: usize,
    /// Images with either dimension above this are downscaled.
    pub max_image_dimension: u32,
    /// Initial JPEG encode quality.
    pub jpeg_quality: u8,
    /// Quality floor for the iterative JPEG size reduction.
    pub jpeg_quality_floor: u8,
    /// Quality decrement per reduction step.
    pub jpeg_quality_step: u8,
    /// Byte budget an encoded image should fit into.
    pub attachment_byte_budget: u64,
    /// Attachments at or below this final size are inlined as data URIs.
    pub inline_threshold: u64,
    /// Downloads larger than this are recorded as skipped.
    pub max_attachment_size: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            run_workers: num_cpus::get().max(2),
            run_worker_ceiling: 8,
            attachment_workers: 4,
            page_size: 250,
            max_image_dimension: 1400,
            jpeg_quality: 85,
            jpeg_quality_floor: 40,
            jpeg_quality_step: 10,
            attachment_byte_budget: 512 * 1024,
            inline_threshold: 256 * 1024,
            max_attachment_size: 25 * 1024 * 1024,
        }
    }
}

impl PipelineConfig {
    /// Effective run-fetch pool size for a given run count: never beyond
    /// the ceiling, never more workers than runs, never zero.
    pub fn run_pool_size(&self, run_count: usize) -> usize {
        self.run_workers
            .min(self.run_worker_ceiling)
            .min(run_count)
            .max(1)
    }

    /// Effective attachment-metadata pool size for a given test count.
    pub fn attachment_pool_size(&self, test_count: usize) -> usize {
        self.attachment_workers.min(test_count).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_sizes_clamp_to_work_available() {
        let config = PipelineConfig {
            run_workers: 12,
            run_worker_ceiling: 8,
            attachment_workers: 4,
            ..PipelineConfig::default()
        };
        assert_eq!(config.run_pool_size(100), 8);
        assert_eq!(config.run_pool_size(3), 3);
        assert_eq!(config.run_pool_size(0), 1);
        assert_eq!(config.attachment_pool_size(2), 2);
        assert_eq!(config.attachment_pool_size(50), 4);
    }

    #[test]
    fn defaults_deserialize_from_empty_table() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.page_size, 250);
        assert_eq!(config.jpeg_quality, 85);
        assert!(config.inline_threshold <= config.attachment_byte_budget);
    }
}
