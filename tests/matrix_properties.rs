use approx::assert_relative_eq;
use fmc_nn::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
    Matrix::random_uniform(rows, cols, -10.0, 10.0, rng)
}

fn assert_close(a: &Matrix, b: &Matrix) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-9, max_relative = 1e-9);
    }
}

#[test]
fn adding_the_negation_gives_zero() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let (r, c) = (rng.gen_range(1..6), rng.gen_range(1..6));
        let a = random_matrix(&mut rng, r, c);
        let sum = a.add(&-a.clone()).unwrap();
        assert_eq!(sum, Matrix::zeros(r, c));
    }
}

#[test]
fn transpose_is_an_involution() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..20 {
        let (r, c) = (rng.gen_range(1..6), rng.gen_range(1..6));
        let a = random_matrix(&mut rng, r, c);
        assert_eq!(a.transpose().transpose(), a);
    }
}

#[test]
fn product_is_associative() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let (m, n, p, q) = (
            rng.gen_range(1..5),
            rng.gen_range(1..5),
            rng.gen_range(1..5),
            rng.gen_range(1..5),
        );
        let a = random_matrix(&mut rng, m, n);
        let b = random_matrix(&mut rng, n, p);
        let c = random_matrix(&mut rng, p, q);

        let left = a.dot(&b).unwrap().dot(&c).unwrap();
        let right = a.dot(&b.dot(&c).unwrap()).unwrap();
        assert_eq!(left.shape(), (m, q));
        assert_close(&left, &right);
    }
}

#[test]
fn in_place_product_matches_dot() {
    let mut rng = StdRng::seed_from_u64(4);
    let a = random_matrix(&mut rng, 3, 4);
    let b = random_matrix(&mut rng, 4, 2);
    let mut c = a.clone();
    c.mul_assign_matrix(&b).unwrap();
    assert_eq!(c, a.dot(&b).unwrap());
    assert_eq!(c.len(), c.rows() * c.cols());
}

#[test]
fn scaling_then_dividing_restores() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..20 {
        let a = random_matrix(&mut rng, 3, 3);
        let k: f64 = rng.gen_range(0.1..100.0) * if rng.gen::<bool>() { 1.0 } else { -1.0 };
        let mut b = a.clone() * k;
        b /= k;
        assert_close(&a, &b);
    }
}

#[test]
fn scalar_add_then_sub_restores() {
    let mut rng = StdRng::seed_from_u64(6);
    let a = random_matrix(&mut rng, 2, 5);
    let mut b = a.clone();
    b += 3.5;
    b -= 3.5;
    assert_close(&a, &b);
}

#[test]
fn works_with_f32() {
    let a = Matrix::from_rows(2, 2, vec![vec![1.0f32, 2.0], vec![3.0, 4.0]]).unwrap();
    let i = Matrix::from_rows(2, 2, vec![vec![1.0f32, 0.0], vec![0.0, 1.0]]).unwrap();
    assert_eq!(a.dot(&i).unwrap(), a);
    assert_eq!(a.transpose().get(0, 1).unwrap(), 3.0f32);
}
