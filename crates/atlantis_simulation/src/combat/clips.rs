//! Attack montage clips.
//!
//! Stage → clip таблица: stage 2 намеренно играет 4-й authored clip (#3).

use bevy::prelude::*;

/// Index into the actor's authored attack clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct AttackClip(pub usize);

pub const DEFAULT_STAGE_CLIPS: [usize; 4] = [0, 1, 3, 4];

/// Clip for `stage`; stages past the table fall back to its first entry.
pub fn clip_for_stage(table: &[usize], stage: usize) -> AttackClip {
    let clip = table
        .get(stage)
        .or_else(|| table.first())
        .copied()
        .unwrap_or(0);
    AttackClip(clip)
}

/// Authored montage lengths (seconds), indexed by clip.
///
/// ECS-side stand-in for the animation collaborator: playing a clip
/// returns its length, unknown clips return 0 (failure).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AttackClips {
    pub lengths: Vec<f32>,
}

impl Default for AttackClips {
    fn default() -> Self {
        Self {
            lengths: vec![0.9, 0.8, 1.0, 1.1, 1.3],
        }
    }
}

impl AttackClips {
    pub fn new(lengths: Vec<f32>) -> Self {
        Self { lengths }
    }

    pub fn length_of(&self, clip: AttackClip) -> f32 {
        self.lengths.get(clip.0).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_table_skips_third_clip() {
        let clips: Vec<usize> = (0..4)
            .map(|stage| clip_for_stage(&DEFAULT_STAGE_CLIPS, stage).0)
            .collect();
        assert_eq!(clips, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_stage_out_of_table_falls_back() {
        assert_eq!(clip_for_stage(&DEFAULT_STAGE_CLIPS, 7), AttackClip(0));
        assert_eq!(clip_for_stage(&[], 0), AttackClip(0));
    }

    #[test]
    fn test_unknown_clip_has_zero_length() {
        let clips = AttackClips::new(vec![0.7]);
        assert_eq!(clips.length_of(AttackClip(0)), 0.7);
        assert_eq!(clips.length_of(AttackClip(3)), 0.0);
    }
}
