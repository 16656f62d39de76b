use crate::error::Error;
use crate::gap::Gap;
use crate::matrix::Matrix;
use quickcheck::{Arbitrary, Gen, QuickCheck};

/// One random edit; positions are reduced modulo the current sizes so most
/// edits hit existing gaps, and a few deliberately miss.
#[derive(Debug, Clone)]
enum Op {
    AddGap { level: u8 },
    UpdateGap { level: u8, index: u8, left: i8, width: u8, amount: u8, high: u8 },
    DeleteGap { level: u8, index: u8 },
    AdjustAmount { level: u8, index: u8, delta: i8 },
    AddLevel,
    DeleteLevel { level: u8 },
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 8 {
            0 | 1 => Op::AddGap { level: u8::arbitrary(g) },
            2 | 3 => Op::UpdateGap {
                level: u8::arbitrary(g),
                index: u8::arbitrary(g),
                left: i8::arbitrary(g),
                width: u8::arbitrary(g),
                amount: u8::arbitrary(g),
                high: u8::arbitrary(g),
            },
            4 => Op::DeleteGap {
                level: u8::arbitrary(g),
                index: u8::arbitrary(g),
            },
            5 => Op::AdjustAmount {
                level: u8::arbitrary(g),
                index: u8::arbitrary(g),
                delta: i8::arbitrary(g),
            },
            6 => Op::AddLevel,
            _ => Op::DeleteLevel { level: u8::arbitrary(g) },
        }
    }
}

/// Map a raw byte onto `0..=len + 1`; both ends are out of range.
fn pick(raw: u8, len: usize) -> usize {
    raw as usize % (len + 2)
}

fn apply(matrix: &mut Matrix, op: &Op) -> Result<(), Error> {
    match *op {
        Op::AddGap { level } => matrix.add_gap(pick(level, matrix.len())).map(drop),
        Op::UpdateGap { level, index, left, width, amount, high } => {
            let level = pick(level, matrix.len());
            let len = matrix.level(level).map_or(0, |l| l.len());
            let left = i64::from(left);
            // A quarter of the updates push the right border up against i64::MAX.
            let right = if high % 4 == 0 {
                i64::MAX - i64::from(high / 4 % 4)
            } else {
                left + i64::from(width) % 12
            };
            let gap = Gap::new(left, right, i64::from(amount)).at(level, pick(index, len));
            matrix.update_gap(gap).map(drop)
        }
        Op::DeleteGap { level, index } => {
            let level = pick(level, matrix.len());
            let len = matrix.level(level).map_or(0, |l| l.len());
            matrix.delete_gap(level, pick(index, len)).map(drop)
        }
        Op::AdjustAmount { level, index, delta } => {
            let level = pick(level, matrix.len());
            let len = matrix.level(level).map_or(0, |l| l.len());
            matrix
                .adjust_amount(level, pick(index, len), i64::from(delta))
                .map(drop)
        }
        Op::AddLevel => {
            matrix.add_level();
            Ok(())
        }
        Op::DeleteLevel { level } => matrix.delete_level(pick(level, matrix.len())).map(drop),
    }
}

fn prop_edits_keep_matrix_valid(ops: Vec<Op>) -> bool {
    let mut matrix = Matrix::default();
    for op in &ops {
        let before = matrix.clone();
        if apply(&mut matrix, op).is_err() && matrix != before {
            return false;
        }
        if matrix.check().is_err() {
            return false;
        }
    }
    true
}

fn prop_lookup_is_total(ops: Vec<Op>, level: u8, count: i64) -> bool {
    let mut matrix = Matrix::default();
    for op in &ops {
        let _ = apply(&mut matrix, op);
    }

    let gap = *matrix.lookup(usize::from(level), count);
    let owner = matrix.level(gap.level);
    owner.and_then(|l| l.gap(gap.index)) == Some(&gap)
        && matrix.reward(usize::from(level), count) == gap.amount
}

fn prop_top_tier_is_open_ended(ops: Vec<Op>, beyond: u32) -> bool {
    let mut matrix = Matrix::default();
    for op in &ops {
        let _ = apply(&mut matrix, op);
    }

    matrix.levels().iter().all(|level| {
        let last = level.last();
        let count = last.right_border.saturating_add(1 + i64::from(beyond));
        *level.lookup(count) == *last
    })
}

fn prop_add_then_delete_round_trips(ops: Vec<Op>, level: u8) -> bool {
    let mut matrix = Matrix::default();
    for op in &ops {
        let _ = apply(&mut matrix, op);
    }

    let level = pick(level, matrix.len()).clamp(1, matrix.len());
    let before = matrix.clone();
    match matrix.add_gap(level) {
        Ok(gap) => matrix.delete_gap(level, gap.index).is_ok() && matrix == before,
        Err(Error::BorderOverflow { .. }) => {
            matrix.level(level).map(|l| l.last().right_border) == Some(i64::MAX)
                && matrix == before
        }
        Err(_) => false,
    }
}

#[test]
fn quickcheck_edits_keep_matrix_valid() {
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop_edits_keep_matrix_valid as fn(Vec<Op>) -> bool);
}

#[test]
fn quickcheck_lookup_is_total() {
    QuickCheck::new()
        .tests(300)
        .quickcheck(prop_lookup_is_total as fn(Vec<Op>, u8, i64) -> bool);
}

#[test]
fn quickcheck_top_tier_is_open_ended() {
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop_top_tier_is_open_ended as fn(Vec<Op>, u32) -> bool);
}

#[test]
fn quickcheck_add_then_delete_round_trips() {
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop_add_then_delete_round_trips as fn(Vec<Op>, u8) -> bool);
}
