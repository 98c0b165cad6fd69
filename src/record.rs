use std::{fs::File, io::Write, path::Path};

use log::{debug, info};

use crate::error::Result;

/// Collaborator receiving per-episode and per-block training results
///
/// The trainer calls [`on_episode`](Recorder::on_episode) once per finished
/// episode, [`on_block`](Recorder::on_block) once per contiguous episode
/// block at the end of the run, and [`close`](Recorder::close) last.
/// `close` must be idempotent.
pub trait Recorder {
    fn on_episode(&mut self, episode: usize, total_reward: f64) -> Result<()>;

    fn on_block(&mut self, block_end: usize, rewards: &[f64]) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

fn mean(rewards: &[f64]) -> f64 {
    if rewards.is_empty() {
        0.0
    } else {
        rewards.iter().sum::<f64>() / rewards.len() as f64
    }
}

/// Emits training results through the `log` facade
#[derive(Debug, Default)]
pub struct LogRecorder;

impl Recorder for LogRecorder {
    fn on_episode(&mut self, episode: usize, total_reward: f64) -> Result<()> {
        debug!("episode {episode}: reward {total_reward}");
        Ok(())
    }

    fn on_block(&mut self, block_end: usize, rewards: &[f64]) -> Result<()> {
        info!(
            "episodes through {block_end}: average reward {}",
            mean(rewards)
        );
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one CSV of per-episode rewards and one of block averages
pub struct CsvRecorder<W: Write> {
    episodes: csv::Writer<W>,
    blocks: csv::Writer<W>,
    closed: bool,
}

impl CsvRecorder<File> {
    /// Create both output files, truncating existing content
    pub fn create<P: AsRef<Path>>(episode_path: P, block_path: P) -> Result<Self> {
        Self::new(File::create(episode_path)?, File::create(block_path)?)
    }
}

impl<W: Write> CsvRecorder<W> {
    pub fn new(episode_writer: W, block_writer: W) -> Result<Self> {
        let mut episodes = csv::Writer::from_writer(episode_writer);
        episodes.write_record(["episode", "reward"])?;
        let mut blocks = csv::Writer::from_writer(block_writer);
        blocks.write_record(["block_end", "average_reward"])?;
        Ok(Self {
            episodes,
            blocks,
            closed: false,
        })
    }
}

impl<W: Write> Recorder for CsvRecorder<W> {
    fn on_episode(&mut self, episode: usize, total_reward: f64) -> Result<()> {
        self.episodes
            .write_record([episode.to_string(), total_reward.to_string()])?;
        Ok(())
    }

    fn on_block(&mut self, block_end: usize, rewards: &[f64]) -> Result<()> {
        self.blocks
            .write_record([block_end.to_string(), mean(rewards).to_string()])?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.episodes.flush()?;
            self.blocks.flush()?;
            self.closed = true;
        }
        Ok(())
    }
}

/// Captures everything in memory, for tests and programmatic consumers
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    pub episodes: Vec<(usize, f64)>,
    pub blocks: Vec<(usize, Vec<f64>)>,
    pub closed: bool,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Recorder for MemoryRecorder {
    fn on_episode(&mut self, episode: usize, total_reward: f64) -> Result<()> {
        self.episodes.push((episode, total_reward));
        Ok(())
    }

    fn on_block(&mut self, block_end: usize, rewards: &[f64]) -> Result<()> {
        self.blocks.push((block_end, rewards.to_vec()));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_recorder_writes_rows() {
        let mut recorder = CsvRecorder::new(Vec::new(), Vec::new()).unwrap();
        recorder.on_episode(0, 1.0).unwrap();
        recorder.on_episode(1, -0.5).unwrap();
        recorder.on_block(100, &[1.0, -0.5]).unwrap();
        recorder.close().unwrap();
        recorder.close().unwrap();

        let episodes = recorder.episodes.into_inner().unwrap();
        let episodes = String::from_utf8(episodes).unwrap();
        assert_eq!(episodes, "episode,reward\n0,1\n1,-0.5\n");

        let blocks = recorder.blocks.into_inner().unwrap();
        let blocks = String::from_utf8(blocks).unwrap();
        assert_eq!(blocks, "block_end,average_reward\n100,0.25\n");
    }

    #[test]
    fn memory_recorder_captures_in_order() {
        let mut recorder = MemoryRecorder::new();
        recorder.on_episode(0, 2.0).unwrap();
        recorder.on_block(100, &[2.0]).unwrap();
        recorder.close().unwrap();

        assert_eq!(recorder.episodes, [(0, 2.0)]);
        assert_eq!(recorder.blocks, [(100, vec![2.0])]);
        assert!(recorder.closed);
    }

    #[test]
    fn mean_of_empty_block_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }
}
