// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Parallel Point Scan
// ─────────────────────────────────────────────────────────────────────
//! Evaluate independent parameter points on scoped worker threads.
//!
//! Each point gets its own `Potential`; instances never cross threads
//! after construction. Work is handed out through a shared cursor and
//! results land in input order.

use parking_lot::Mutex;

use bsmpt_types::{BsmptError, BsmptResult};

use crate::potential::Potential;

/// Build and evaluate one model instance per point.
///
/// `workers` is clamped to `1..=points.len()`. A failing point yields an
/// `Err` in its slot without stopping the scan.
pub fn run_points<P, R, B, E>(
    points: &[P],
    build: B,
    evaluate: E,
    workers: usize,
) -> Vec<BsmptResult<R>>
where
    P: Sync,
    R: Send,
    B: Fn(&P) -> BsmptResult<Potential> + Sync,
    E: Fn(&mut Potential) -> BsmptResult<R> + Sync,
{
    let workers = workers.clamp(1, points.len().max(1));
    let cursor = Mutex::new(0usize);
    let slots: Mutex<Vec<Option<BsmptResult<R>>>> =
        Mutex::new((0..points.len()).map(|_| None).collect());

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = {
                    let mut next = cursor.lock();
                    if *next >= points.len() {
                        break;
                    }
                    *next += 1;
                    *next - 1
                };
                let result =
                    build(&points[index]).and_then(|mut potential| evaluate(&mut potential));
                if let Err(err) = &result {
                    log::warn!("scan point {index} failed: {err}");
                }
                slots.lock()[index] = Some(result);
            });
        }
    });

    slots
        .into_inner()
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(BsmptError::Numerical(
                    "scan point was not evaluated".to_string(),
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_build_keeps_order() {
        let points: Vec<i64> = (0..7).collect();
        let results: Vec<BsmptResult<i64>> = run_points(
            &points,
            |&p| Err(BsmptError::InvalidModelType(p)),
            |_| Ok(0),
            3,
        );
        assert_eq!(results.len(), 7);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r, &Err(BsmptError::InvalidModelType(i as i64)));
        }
    }

    #[test]
    fn test_empty_scan() {
        let points: Vec<i64> = Vec::new();
        let results: Vec<BsmptResult<()>> =
            run_points(&points, |_| Err(BsmptError::InvalidModelType(0)), |_| Ok(()), 4);
        assert!(results.is_empty());
    }
}
