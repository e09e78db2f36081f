use trellis::{shape, Layout, Shape, ShapeList};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn two_dim_views() {
    init_logs();
    let base = Layout::new(shape![10, 4]);
    assert_eq!(base.footprint(), 40);
    assert_eq!(base.numel(), 40);
    assert!(base.is_contiguous());

    let row = base.select(0, 3);
    assert_eq!(row.rank(), 1);
    assert_eq!(row.shape(), &shape![4]);
    assert_eq!(row.offset(), 12);

    let band = base.narrow(0, 6, 2);
    assert_eq!(band.shape(), &shape![6, 4]);
    assert_eq!(band.offset(), 8);
}

#[test]
fn unfold_builds_a_sliding_window() {
    init_logs();
    let base = Layout::new(shape![9, 4]);
    let windows = base.unfold(0, 5, 2);
    assert_eq!(windows.rank(), 3);
    assert_eq!(windows.shape(), &shape![3, 4, 5]);
    assert_eq!(windows.stride(2), base.stride(0));
    assert_eq!(windows.stride(0), base.stride(0) * 2);
    assert_eq!(windows.offset(), base.offset());
}

#[test]
fn shapes_compare_by_dims_alone() {
    init_logs();
    let a = shape![3, 4];
    let b = shape![3, 4];
    assert_eq!(a, b);
    assert_ne!(a, shape![4, 3]);

    // differently-strided views of one logical shape yield equal shapes
    let contiguous = Layout::new(shape![3, 4]);
    let strided = Layout::new(shape![3, 8]).narrow(1, 4, 0);
    assert!(!strided.is_contiguous());
    assert_eq!(Shape::from(&contiguous), Shape::from(&strided));
}

#[test]
fn resize_axis_recomputes_row_major_strides() {
    init_logs();
    let mut grid = Layout::new(shape![4, 5]);
    let footprint = grid.resize_axis(0, 6);
    assert_eq!(footprint, 30);
    assert_eq!(grid.shape(), &shape![6, 5]);
    assert_eq!(grid.strides().to_vec(), vec![5, 1]);
    assert!(grid.is_contiguous());

    // growing an inner axis repacks the outer ones
    let footprint = grid.resize_axis(1, 7);
    assert_eq!(footprint, 42);
    assert_eq!(grid.strides().to_vec(), vec![7, 1]);
}

#[test]
fn resize_keeps_rank_and_offset() {
    init_logs();
    let mut plane = Layout::with_offset(6, shape![4, 5]);
    let footprint = plane.resize(&shape![2, 9]);
    assert_eq!(footprint, 24);
    assert_eq!(plane.offset(), 6);
    assert_eq!(plane.shape(), &shape![2, 9]);
    assert!(plane.is_contiguous());
}

#[test]
fn convolution_window_pipeline() {
    init_logs();
    // one 3-channel 9x9 feature map
    let image = Layout::new(shape![3, 9, 9]);
    let green = image.select(0, 1);
    assert_eq!(green.shape(), &shape![9, 9]);
    assert_eq!(green.offset(), 81);

    // 3x3 windows at stride 3 over both spatial axes
    let tiles = green.unfold(0, 3, 3).unfold(1, 3, 3);
    assert_eq!(tiles.shape(), &shape![3, 3, 3, 3]);
    assert_eq!(tiles.strides().to_vec(), vec![27, 3, 9, 1]);

    // first element of tile (1, 1) sits 3 rows and 3 columns in
    assert_eq!(tiles.position(&[1, 1, 0, 0]), 81 + 27 + 3);

    // kernels iterating windows first see them as leading axes
    let window_major = tiles.permute(&[2, 3, 0, 1]);
    assert_eq!(window_major.shape(), &shape![3, 3, 3, 3]);
    assert_eq!(window_major.strides().to_vec(), vec![9, 1, 27, 3]);
    assert_eq!(window_major.offset(), tiles.offset());
}

#[test]
fn aliasing_in_place_transforms_match_pure_results() {
    init_logs();
    let base = Layout::new(shape![2, 3, 4]);

    let mut narrowed = base.clone();
    narrowed.narrow_in_place(2, 2, 1);
    assert_eq!(narrowed, base.narrow(2, 2, 1));

    let mut selected = base.clone();
    selected.select_in_place(1, 2);
    assert_eq!(selected, base.select(1, 2));

    let mut permuted = base.clone();
    permuted.permute_in_place(&[1, 2, 0]);
    assert_eq!(permuted, base.permute(&[1, 2, 0]));

    let mut unfolded = base.clone();
    unfolded.unfold_in_place(2, 2, 2);
    assert_eq!(unfolded, base.unfold(2, 2, 2));
}

#[test]
fn branch_shape_bookkeeping() {
    init_logs();
    // a two-branch stage with a disabled middle branch
    let mut branches = ShapeList::new();
    branches.push(shape![16, 8, 8]);
    branches.push_hole();
    branches.push(shape![16, 8, 8]);

    let merged = branches.merge_all();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.get(0), Some(&shape![16, 8, 8]));

    let tail = branches.narrow(2, 1);
    assert_eq!(tail.get(0), None);
    assert_eq!(tail.get(1), Some(&shape![16, 8, 8]));
}

#[test]
fn shape_planning_round_trip() {
    init_logs();
    // plan a padded allocation from an existing view
    let view = Layout::new(shape![32, 24]);
    let mut padded = Shape::from(&view);
    padded.insert_dim(0, 3);
    let grown = &padded + 4usize;
    assert_eq!(grown, shape![7, 36, 28]);

    let plan = Layout::new(grown);
    assert_eq!(plan.footprint(), 7 * 36 * 28);
    assert!(plan.is_contiguous());
}
