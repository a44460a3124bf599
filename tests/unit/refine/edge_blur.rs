use super::*;

fn res(w: u32, h: u32) -> Resolution {
    Resolution::new(w, h).unwrap()
}

fn step_aux(r: Resolution, split: u32) -> Vec<f64> {
    (0..r.height)
        .flat_map(|_| (0..r.width).map(move |x| if x < split { 1.0 } else { 0.0 }))
        .collect()
}

#[test]
fn kernel_is_normalized_and_symmetric() {
    for radius in [0.3, 1.0, 1.7, 2.0] {
        let k = gaussian_kernel(radius);
        assert_eq!(k.len(), 2 * radius.ceil() as usize + 1);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for i in 0..k.len() / 2 {
            assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-15);
        }
    }
    assert_eq!(gaussian_kernel(0.0), vec![1.0]);
}

#[test]
fn flat_aux_has_zero_proximity() {
    let r = res(9, 9);
    let aux = vec![0.4; 81];
    assert_eq!(edge_proximity(&aux, r, 4, 4), 0.0);
}

#[test]
fn proximity_grows_toward_the_edge() {
    let r = res(16, 9);
    let aux = step_aux(r, 8);
    // Window columns across the split: 3 at x=7 and x=8, 1 at x=10, 0 at x=12.
    let at = |x| edge_proximity(&aux, r, x, 4);
    assert!((at(7) - (21.0f64 / 24.0).powi(2)).abs() < 1e-12);
    assert!(at(10) < at(8));
    assert_eq!(at(12), 0.0);
}

#[test]
fn far_pixels_pass_through_and_edges_soften() {
    let r = res(16, 8);
    let aux = step_aux(r, 8);
    let color: Vec<DVec3> = aux.iter().map(|&a| DVec3::splat(a)).collect();
    let out = edge_blur(&color, &aux, r, false);

    assert_eq!(out[3 * 16 + 1], DVec3::ONE);
    assert_eq!(out[3 * 16 + 14], DVec3::ZERO);
    let left = out[3 * 16 + 7].x;
    let right = out[3 * 16 + 8].x;
    assert!(left < 1.0 && left > 0.5);
    assert!(right > 0.0 && right < 0.5);
}

#[test]
fn parallel_rows_match_sequential() {
    let r = res(12, 10);
    let aux: Vec<f64> = (0..120).map(|i| f64::from((i * 7 % 11) as u32) / 10.0).collect();
    let color: Vec<DVec3> = (0..120)
        .map(|i| DVec3::new(f64::from(i as u32) / 120.0, 0.5, 1.0))
        .collect();
    assert_eq!(
        edge_blur(&color, &aux, r, false),
        edge_blur(&color, &aux, r, true)
    );
}
