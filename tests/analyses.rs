//! Cross-component checks: the optimized implementations against direct
//! transcriptions of the reference algorithms, and the file formats end to
//! end.

use approx::assert_relative_eq;
use ndarray::Array1;
use pindex::io::{load_interaction_matrix, write_pindex};
use pindex::kruskal;
use pindex::popularity::{self, NoopProgress};
use pindex::sparse::SparseColMatrix;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::Write as _;

fn random_membership_matrix(rng: &mut StdRng, items: usize, users: usize) -> SparseColMatrix {
    let mut entries = Vec::new();
    for user in 0..users {
        // Guarantee at least one owned item per user.
        entries.push((rng.gen_range(0..items) as u32, user as u32, 1.0));
        for item in 0..items {
            if rng.r#gen::<f64>() < 0.2 {
                entries.push((item as u32, user as u32, rng.gen_range(1..50) as f64));
            }
        }
    }
    SparseColMatrix::from_triplets(items, users, &entries).unwrap()
}

/// Direct transcription of the original scan: materialize every share
/// percentage, deduplicate into an ascending list, walk it from the top
/// accumulating the user count.
fn reference_pindex(matrix: &SparseColMatrix, user: usize) -> u8 {
    let n = matrix.cols();
    let owned = matrix.col_nnz(user);
    let percents: Vec<usize> = (0..n)
        .map(|j| (matrix.intersection_count(user, j) as f64 / owned as f64 * 100.0) as usize)
        .collect();

    let mut distinct = percents.clone();
    distinct.sort_unstable();
    distinct.dedup();

    let mut count = 0usize;
    let mut j = distinct.len();
    loop {
        j -= 1;
        count += percents.iter().filter(|&&p| p == distinct[j]).count();
        if (count as f64 - 1.0) / (n as f64 - 1.0) * 100.0 >= distinct[j] as f64 {
            return distinct[j] as u8;
        }
    }
}

#[test]
fn histogram_scan_matches_distinct_set_scan_on_random_matrices() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for trial in 0..20 {
        let users = rng.gen_range(2..40);
        let items = rng.gen_range(1..60);
        let matrix = random_membership_matrix(&mut rng, items, users);
        let values = popularity::compute_all(&matrix, &NoopProgress).unwrap();
        for user in 0..users {
            assert_eq!(
                values[user],
                reference_pindex(&matrix, user),
                "trial {trial}, user {user}"
            );
        }
    }
}

/// For tie-free data the tie-corrected form used here reduces to the
/// textbook `12 / (N (N + 1)) * sum n_g rbar_g^2 - 3 (N + 1)` expression.
#[test]
fn h_statistic_matches_textbook_formula_without_ties() {
    let mut rng = StdRng::seed_from_u64(0xAB1E);
    for _ in 0..20 {
        let sizes = [
            rng.gen_range(2..12usize),
            rng.gen_range(2..12usize),
            rng.gen_range(2..12usize),
        ];
        let total: usize = sizes.iter().sum();

        // Distinct scores, shuffled into groups: no ties by construction.
        let mut pool: Vec<f64> = (0..total).map(|v| v as f64).collect();
        pool.shuffle(&mut rng);
        let g1 = Array1::from_vec(pool[..sizes[0]].to_vec());
        let g2 = Array1::from_vec(pool[sizes[0]..sizes[0] + sizes[1]].to_vec());
        let g3 = Array1::from_vec(pool[sizes[0] + sizes[1]..].to_vec());

        let h = kruskal::h_statistic(g1.view(), g2.view(), g3.view()).unwrap();

        let n = total as f64;
        let rank_of = |v: f64| v + 1.0;
        let mut textbook = 0.0;
        for group in [&g1, &g2, &g3] {
            let mean: f64 = group.iter().map(|&v| rank_of(v)).sum::<f64>() / group.len() as f64;
            textbook += group.len() as f64 * mean * mean;
        }
        textbook = 12.0 / (n * (n + 1.0)) * textbook - 3.0 * (n + 1.0);

        assert!(h >= 0.0);
        assert_relative_eq!(h, textbook, epsilon = 1e-9);
    }
}

#[test]
fn csv_to_pindex_file_end_to_end() {
    // The worked 3-user scenario: A and C own everything, B owns half.
    let mut input = tempfile::NamedTempFile::new().unwrap();
    write!(
        input,
        "item,user,plays\n\
         0,0,3\n1,0,1\n2,0,4\n3,0,1\n\
         0,1,5\n1,1,9\n\
         0,2,2\n1,2,6\n2,2,5\n3,2,3\n"
    )
    .unwrap();
    input.flush().unwrap();

    let matrix = load_interaction_matrix(input.path()).unwrap();
    let values = popularity::compute_all(&matrix, &NoopProgress).unwrap();
    assert_eq!(values, vec![50, 100, 50]);

    let output = tempfile::NamedTempFile::new().unwrap();
    write_pindex(output.path(), &values).unwrap();
    assert_eq!(
        std::fs::read_to_string(output.path()).unwrap(),
        "50\n100\n50\n"
    );
}
