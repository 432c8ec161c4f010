use anyhow::{bail, Context, Result};
use log::debug;

use crate::model::ScoreModel;
use crate::window::Window;

/// 推理分批器：按固定大小把窗口分组依次交给模型，并按原顺序收集输出。
///
/// 不重排、不丢弃，最后不足一批的窗口同样提交。任一批失败则整个调用失败，
/// 不返回部分结果。
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    batch_size: usize,
}

impl Batcher {
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            bail!("batch size must be positive");
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn run<M: ScoreModel + ?Sized>(&self, model: &M, windows: &[Window]) -> Result<Vec<Vec<f32>>> {
        let mut outputs = Vec::with_capacity(windows.len());
        let chunks = windows.chunks(self.batch_size);
        let n_batches = chunks.len();
        for (bi, chunk) in chunks.enumerate() {
            debug!("dispatching batch {}/{} ({} windows)", bi + 1, n_batches, chunk.len());
            let inputs: Vec<&[u8]> = chunk.iter().map(|w| w.codes.as_slice()).collect();
            let scores = model
                .evaluate(&inputs)
                .with_context(|| format!("model failed on batch {} ({} windows)", bi, chunk.len()))?;
            if scores.len() != chunk.len() {
                bail!(
                    "model returned {} outputs for batch {} of {} windows",
                    scores.len(),
                    bi,
                    chunk.len()
                );
            }
            outputs.extend(scores);
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// 记录每次调用批大小的模型，输出为输入编码本身
    struct Echo {
        calls: RefCell<Vec<usize>>,
        fail_on: Option<usize>,
    }

    impl Echo {
        fn new() -> Self {
            Self { calls: RefCell::new(Vec::new()), fail_on: None }
        }
    }

    impl ScoreModel for Echo {
        fn window_len(&self) -> usize {
            4
        }

        fn evaluate(&self, batch: &[&[u8]]) -> Result<Vec<Vec<f32>>> {
            let call = self.calls.borrow().len();
            self.calls.borrow_mut().push(batch.len());
            if self.fail_on == Some(call) {
                bail!("device error");
            }
            Ok(batch.iter().map(|w| w.iter().map(|&c| c as f32).collect()).collect())
        }
    }

    fn windows(n: usize) -> Vec<Window> {
        (0..n)
            .map(|i| Window { seq_id: i / 2, ordinal: i % 2, codes: vec![i as u8; 4] })
            .collect()
    }

    #[test]
    fn submits_final_partial_batch() {
        let model = Echo::new();
        let out = Batcher::new(3).unwrap().run(&model, &windows(7)).unwrap();
        assert_eq!(*model.calls.borrow(), vec![3, 3, 1]);
        assert_eq!(out.len(), 7);
        for (i, o) in out.iter().enumerate() {
            assert_eq!(o, &vec![i as f32; 4]);
        }
    }

    #[test]
    fn output_is_independent_of_batch_size() {
        let ws = windows(11);
        let reference = Batcher::new(1).unwrap().run(&Echo::new(), &ws).unwrap();
        for bs in [2, 3, 5, 11, 64] {
            let out = Batcher::new(bs).unwrap().run(&Echo::new(), &ws).unwrap();
            assert_eq!(out, reference, "batch size {}", bs);
        }
    }

    #[test]
    fn model_failure_fails_whole_run() {
        let model = Echo { calls: RefCell::new(Vec::new()), fail_on: Some(1) };
        let err = Batcher::new(2).unwrap().run(&model, &windows(6)).unwrap_err();
        assert!(format!("{:#}", err).contains("batch 1"));
        assert_eq!(model.calls.borrow().len(), 2);
    }

    #[test]
    fn oversized_batch_is_single_call() {
        let model = Echo::new();
        let out = Batcher::new(usize::MAX).unwrap().run(&model, &windows(5)).unwrap();
        assert_eq!(*model.calls.borrow(), vec![5]);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn zero_batch_size_rejected() {
        assert!(Batcher::new(0).is_err());
    }
}
