use std::str::FromStr;

pub fn range_parser(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
    if parts.len() != 2 {
        return Err(format!("Expected 'lo,hi', got '{}'", s));
    }
    let lo = f64::from_str(parts[0]).map_err(|e| format!("Invalid lower bound '{}': {}", parts[0], e))?;
    let hi = f64::from_str(parts[1]).map_err(|e| format!("Invalid upper bound '{}': {}", parts[1], e))?;
    if lo > hi {
        return Err(format!("Lower bound {} exceeds upper bound {}", lo, hi));
    }
    Ok((lo, hi))
}

pub fn shape_parser(s: &str) -> Result<(usize, usize), String> {
    let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
    if parts.len() != 2 {
        return Err(format!("Expected 'freq,time', got '{}'", s));
    }
    let f = usize::from_str(parts[0]).map_err(|e| format!("Invalid freq extent '{}': {}", parts[0], e))?;
    let t = usize::from_str(parts[1]).map_err(|e| format!("Invalid time extent '{}': {}", parts[1], e))?;
    if f == 0 || t == 0 {
        return Err("Window extents must be positive".to_string());
    }
    Ok((f, t))
}

pub fn grid_parser(s: &str) -> Result<(f64, f64, f64), String> {
    let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 {
        return Err(format!("Expected 'lo,hi,step', got '{}'", s));
    }
    let lo = f64::from_str(parts[0]).map_err(|e| format!("Invalid start '{}': {}", parts[0], e))?;
    let hi = f64::from_str(parts[1]).map_err(|e| format!("Invalid end '{}': {}", parts[1], e))?;
    let step = f64::from_str(parts[2]).map_err(|e| format!("Invalid step '{}': {}", parts[2], e))?;
    if step <= 0.0 {
        return Err(format!("Step must be positive, got {}", step));
    }
    if lo > hi {
        return Err(format!("Start {} exceeds end {}", lo, hi));
    }
    Ok((lo, hi, step))
}

/// Inclusive frequency grid: lo, lo+step, ... up to hi (within half a step).
pub fn frange(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 {
        return Vec::new();
    }
    let count = ((hi - lo) / step + 0.5).floor() as usize + 1;
    (0..count).map(|i| lo + i as f64 * step).collect()
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_parser() {
        assert_eq!(range_parser("13,30"), Ok((13.0, 30.0)));
        assert_eq!(range_parser(" 8 , 13 "), Ok((8.0, 13.0)));
        assert!(range_parser("30,13").is_err());
        assert!(range_parser("13").is_err());
        assert!(range_parser("a,b").is_err());
    }

    #[test]
    fn test_shape_parser() {
        assert_eq!(shape_parser("5,5"), Ok((5, 5)));
        assert_eq!(shape_parser("1,3"), Ok((1, 3)));
        assert!(shape_parser("0,5").is_err());
        assert!(shape_parser("5").is_err());
    }

    #[test]
    fn test_grid_parser() {
        assert_eq!(grid_parser("0.1,40,0.1"), Ok((0.1, 40.0, 0.1)));
        assert!(grid_parser("0.1,40,0").is_err());
        assert!(grid_parser("40,0.1,0.1").is_err());
    }

    #[test]
    fn test_frange() {
        assert_eq!(frange(1.0, 3.0, 1.0), vec![1.0, 2.0, 3.0]);
        let grid = frange(0.1, 40.0, 0.1);
        assert_eq!(grid.len(), 400);
        assert!((grid[0] - 0.1).abs() < 1e-9);
        assert!((grid[399] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[7.0]), 7.0);
        assert!(median(&[]).is_nan());
    }
}
