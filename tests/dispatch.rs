//! Tests for compute dispatch over images: result order, exclusive mutable access, failure
//! aggregation and both execution backends.

use std::sync::Mutex;

use spartan::{Backend, Dispatcher, DistributedMatrix, MatrixImage, SpError, Triplet};

fn backends() -> Vec<Dispatcher> {
    let mut all = vec![Dispatcher::new(Backend::Threads, None).unwrap()];
    #[cfg(feature = "rayon")]
    {
        all.push(Dispatcher::default());
        all.push(Dispatcher::new(Backend::Rayon, Some(3)).unwrap());
    }
    all
}

/// Three processors holding 5, 3 and 2 entries via a custom distribution.
fn five_three_two(dispatcher: Dispatcher) -> DistributedMatrix<f64> {
    let mut a = DistributedMatrix::<f64>::with_procs(10, 1, 3);
    a.set_dispatcher(dispatcher);
    a.set_distribution_function(|row, _| match row {
        0..=4 => 0,
        5..=7 => 1,
        _ => 2,
    });
    a.set_from_triplets((0..10).map(|i| Triplet::new(i, 0, i as f64))).unwrap();
    a
}

/// The mapping form returns one result per image, indexed by processor.
#[test]
fn mapping_dispatch_counts() {
    for d in backends() {
        let backend = d.backend();
        let a = five_three_two(d);
        let counts = a.compute(MatrixImage::non_zeros).unwrap();
        assert_eq!(counts, vec![5, 3, 2], "{backend:?}");
    }
}

/// Same counts when the images are installed wholesale.
#[test]
fn mapping_dispatch_over_reset_images() {
    let images: Vec<MatrixImage<f64>> = [5, 3, 2]
        .iter()
        .map(|&n| (0..n).map(|i| Triplet::new(i, 0, 1.0)).collect())
        .collect();
    let mut a = DistributedMatrix::<f64>::new(5, 1);
    a.reset_images(images).unwrap();
    assert_eq!(a.procs(), 3);
    assert_eq!(a.compute(|img| img.non_zeros()).unwrap(), vec![5, 3, 2]);
}

/// Every image is visited exactly once by the side-effecting form.
#[test]
fn compute_each_visits_every_image() {
    for d in backends() {
        let a = five_three_two(d);
        let seen = Mutex::new(Vec::new());
        a.compute_each(|img, s| seen.lock().unwrap().push((s, img.non_zeros()))).unwrap();
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, vec![(0, 5), (1, 3), (2, 2)]);
    }
}

/// Mutable dispatch hands each task its own image.
#[test]
fn compute_each_mut_is_exclusive() {
    for d in backends() {
        let mut a = five_three_two(d);
        a.compute_each_mut(|img, s| {
            // drop all but `s` entries from every image
            while img.non_zeros() > s {
                img.pop_element(0);
            }
        })
        .unwrap();
        assert_eq!(a.compute(MatrixImage::non_zeros).unwrap(), vec![0, 1, 2]);
        assert_eq!(a.non_zeros(), 3);
    }
}

/// Failing tasks are collected into one error once all tasks are done.
#[test]
fn failures_are_aggregated() {
    for d in backends() {
        let a = five_three_two(d);
        let err = a
            .try_compute(|img| {
                if img.non_zeros() < 4 {
                    Err(format!("only {} entries", img.non_zeros()))
                } else {
                    Ok(img.non_zeros())
                }
            })
            .unwrap_err();
        match err {
            SpError::Dispatch { failures } => assert_eq!(
                failures,
                vec![(1, "only 3 entries".to_string()), (2, "only 2 entries".to_string())]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }
}

/// A task panic reaches the caller.
#[test]
#[should_panic(expected = "image 1")]
fn panics_propagate() {
    let a = five_three_two(Dispatcher::new(Backend::Threads, None).unwrap());
    let _ = a.compute_each(|_, s| {
        if s == 1 {
            panic!("image 1 gave up");
        }
    });
}

/// Column and row weights are reductions over the images.
#[test]
fn weights() {
    let a = five_three_two(Dispatcher::default());
    assert_eq!(a.column_weight(0).unwrap(), 10);
    assert_eq!(a.row_weight(7).unwrap(), 1);
    assert_eq!(a.row_weight(9).unwrap(), 1);
}
