//! Labelled data sets in the layout networks consume.
//!
//! Every `DataSet` stores its features with a bias column of ones already
//! prepended, so `images()` can be fed to a network directly.

use crate::error::{Error, Result};
use crate::matrix::{self, Mat};

use ndarray::Axis;
use ndarray_rand::rand_distr::Normal;
use rand::distributions::Distribution;
use rand::Rng;
use std::fs;
use std::path::Path;

const IMAGE_MAGIC: u32 = 2051;
const LABEL_MAGIC: u32 = 2049;

/// Number of MNIST training records kept by `read_data_sets`.
pub const TRAIN_RECORDS: usize = 20_000;
/// Number of MNIST test records kept by `read_data_sets`.
pub const TEST_RECORDS: usize = 2_000;
/// Every `VALIDATION_STRIDE`-th training record is held out for validation.
pub const VALIDATION_STRIDE: usize = 10;

/// A batch of examples with one integer class label each.
#[derive(Clone, Debug)]
pub struct DataSet {
    images: Mat,
    labels: Vec<usize>,
}

impl DataSet {
    /// Creates a data set from raw `features`, one row per label, prepending
    /// the bias column.
    pub fn new(features: Mat, labels: Vec<usize>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(Error::Data(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(DataSet {
            images: matrix::prepend_bias(&features),
            labels,
        })
    }

    /// Returns the examples, bias column included.
    pub fn images(&self) -> &Mat {
        &self.images
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Returns the width of each example, bias column included.
    pub fn dim(&self) -> usize {
        self.images.ncols()
    }

    /// Returns the number of examples.
    pub fn size(&self) -> usize {
        self.images.nrows()
    }

    /// Returns the labels one-hot encoded over `classes` columns.
    pub fn one_hot(&self, classes: usize) -> Result<Mat> {
        matrix::one_hot(&self.labels, classes)
    }

    /// Returns the labels as a single column.
    pub fn label_column(&self) -> Mat {
        Mat::from_shape_fn((self.labels.len(), 1), |(row, _)| self.labels[row] as f64)
    }

    /// Returns the first `n` examples, or all of them if there are fewer.
    pub fn take(&self, n: usize) -> DataSet {
        let rows: Vec<usize> = (0..n.min(self.size())).collect();
        self.select(&rows)
    }

    /// Splits off every `n`-th example (starting with the first) into a
    /// second set. Returns `(rest, held_out)`.
    pub fn split_every(&self, n: usize) -> Result<(DataSet, DataSet)> {
        if n == 0 {
            return Err(Error::Data("split stride must be positive".into()));
        }
        let (held_out, rest): (Vec<usize>, Vec<usize>) =
            (0..self.size()).partition(|row| row % n == 0);
        Ok((self.select(&rest), self.select(&held_out)))
    }

    /// Keeps only examples of the two classes and relabels them for binary
    /// classification: `positive` becomes 1 and `negative` becomes 0.
    pub fn binary(&self, positive: usize, negative: usize) -> DataSet {
        let rows: Vec<usize> = (0..self.size())
            .filter(|&row| self.labels[row] == positive || self.labels[row] == negative)
            .collect();
        let mut subset = self.select(&rows);
        for label in &mut subset.labels {
            *label = if *label == positive { 1 } else { 0 };
        }
        subset
    }

    fn select(&self, rows: &[usize]) -> DataSet {
        DataSet {
            images: self.images.select(Axis(0), rows),
            labels: rows.iter().map(|&row| self.labels[row]).collect(),
        }
    }
}

/// Training, validation and test splits of one corpus.
#[derive(Clone, Debug)]
pub struct DataSets {
    pub train: DataSet,
    pub validation: DataSet,
    pub test: DataSet,
}

impl DataSets {
    /// Applies `DataSet::binary` to every split.
    pub fn binary(&self, positive: usize, negative: usize) -> DataSets {
        DataSets {
            train: self.train.binary(positive, negative),
            validation: self.validation.binary(positive, negative),
            test: self.test.binary(positive, negative),
        }
    }
}

/// Reads MNIST from the uncompressed IDX files in `directory`.
///
/// The first `TRAIN_RECORDS` training records are kept, with every
/// `VALIDATION_STRIDE`-th one moved to the validation split, along with the
/// first `TEST_RECORDS` test records.
pub fn read_data_sets<P: AsRef<Path>>(directory: P) -> Result<DataSets> {
    let dir = directory.as_ref();
    let train = DataSet::new(
        read_idx_images(dir.join("train-images-idx3-ubyte"))?,
        read_idx_labels(dir.join("train-labels-idx1-ubyte"))?,
    )?
    .take(TRAIN_RECORDS);
    let (train, validation) = train.split_every(VALIDATION_STRIDE)?;
    let test = DataSet::new(
        read_idx_images(dir.join("t10k-images-idx3-ubyte"))?,
        read_idx_labels(dir.join("t10k-labels-idx1-ubyte"))?,
    )?
    .take(TEST_RECORDS);
    log::info!(
        "loaded {} training, {} validation and {} test records from {}",
        train.size(),
        validation.size(),
        test.size(),
        dir.display()
    );
    Ok(DataSets {
        train,
        validation,
        test,
    })
}

/// Reads an IDX image file, one flattened image per row, with pixels scaled
/// to `[0, 1]`.
pub fn read_idx_images<P: AsRef<Path>>(path: P) -> Result<Mat> {
    let bytes = fs::read(path)?;
    check_magic(&bytes, IMAGE_MAGIC)?;
    let count = read_u32(&bytes, 4)? as usize;
    let rows = read_u32(&bytes, 8)? as usize;
    let cols = read_u32(&bytes, 12)? as usize;
    let (pixels, total) = match rows
        .checked_mul(cols)
        .and_then(|pixels| count.checked_mul(pixels).map(|total| (pixels, total)))
    {
        Some(sizes) => sizes,
        None => return Err(Error::Data("IDX image dimensions overflow".into())),
    };
    let body = &bytes[16..];
    if body.len() != total {
        return Err(Error::Data(format!(
            "expected {} pixel bytes, found {}",
            total,
            body.len()
        )));
    }
    let data = body.iter().map(|&p| f64::from(p) / 255.0).collect();
    Mat::from_shape_vec((count, pixels), data).map_err(|e| Error::Data(e.to_string()))
}

/// Reads an IDX label file.
pub fn read_idx_labels<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let bytes = fs::read(path)?;
    check_magic(&bytes, LABEL_MAGIC)?;
    let count = read_u32(&bytes, 4)? as usize;
    let body = &bytes[8..];
    if body.len() != count {
        return Err(Error::Data(format!(
            "expected {} labels, found {}",
            count,
            body.len()
        )));
    }
    Ok(body.iter().map(|&label| label as usize).collect())
}

fn check_magic(bytes: &[u8], expected: u32) -> Result<()> {
    let magic = read_u32(bytes, 0)?;
    if magic != expected {
        return Err(Error::Data(format!(
            "bad IDX magic number {}, expected {}",
            magic, expected
        )));
    }
    Ok(())
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    match bytes.get(offset..offset + 4) {
        Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(Error::Data("truncated IDX header".into())),
    }
}

/// Samples `per_class` points around each of `centers` with isotropic
/// Gaussian noise of standard deviation `std`. Points around `centers[k]` are
/// labelled `k`.
pub fn gaussian_blobs<R: Rng>(
    centers: &[Vec<f64>],
    per_class: usize,
    std: f64,
    rng: &mut R,
) -> Result<DataSet> {
    let width = centers.first().map_or(0, |c| c.len());
    if centers.iter().any(|c| c.len() != width) {
        return Err(Error::Data("blob centers differ in dimension".into()));
    }
    let noise = Normal::new(0.0, std).map_err(|e| Error::Distribution(e.to_string()))?;

    let mut features = Mat::zeros((centers.len() * per_class, width));
    let mut labels = Vec::with_capacity(centers.len() * per_class);
    for (class, center) in centers.iter().enumerate() {
        for i in 0..per_class {
            let mut row = features.row_mut(class * per_class + i);
            for (x, &c) in row.iter_mut().zip(center) {
                *x = c + noise.sample(rng);
            }
            labels.push(class);
        }
    }
    DataSet::new(features, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::env;

    fn digits() -> DataSet {
        let features = array![[0.1], [0.2], [0.3], [0.4], [0.5], [0.6]];
        DataSet::new(features, vec![3, 7, 3, 1, 7, 7]).unwrap()
    }

    #[test]
    fn bias_column_is_prepended() {
        let data = digits();
        assert_eq!(data.dim(), 2);
        assert_eq!(data.size(), 6);
        assert!(data.images().column(0).iter().all(|&b| b == 1.0));
        assert_eq!(data.images()[[2, 1]], 0.3);
    }

    #[test]
    fn label_count_must_match() {
        assert!(DataSet::new(Mat::zeros((3, 2)), vec![0, 1]).is_err());
    }

    #[test]
    fn binary_relabels_and_filters() {
        let binary = digits().binary(7, 3);
        assert_eq!(binary.labels(), &[0, 1, 0, 1, 1]);
        assert_eq!(binary.images()[[3, 1]], 0.5);
        assert_eq!(binary.label_column(), array![[0.0], [1.0], [0.0], [1.0], [1.0]]);
    }

    #[test]
    fn split_every_holds_out_strided_rows() {
        let (rest, held_out) = digits().split_every(3).unwrap();
        assert_eq!(held_out.labels(), &[3, 1]);
        assert_eq!(rest.labels(), &[7, 3, 7, 7]);
        assert!(digits().split_every(0).is_err());
    }

    #[test]
    fn take_truncates() {
        assert_eq!(digits().take(2).size(), 2);
        assert_eq!(digits().take(100).size(), 6);
    }

    #[test]
    fn one_hot_targets() {
        let t = digits().take(2).one_hot(8).unwrap();
        assert_eq!(t.dim(), (2, 8));
        assert_eq!(t[[0, 3]], 1.0);
        assert_eq!(t[[1, 7]], 1.0);
        assert_eq!(t.sum(), 2.0);
    }

    #[test]
    fn blobs_are_labelled_by_center() {
        let mut rng = StdRng::seed_from_u64(0);
        let centers = vec![vec![5.0, 5.0], vec![-5.0, -5.0], vec![5.0, -5.0]];
        let data = gaussian_blobs(&centers, 4, 0.1, &mut rng).unwrap();
        assert_eq!(data.size(), 12);
        assert_eq!(data.dim(), 3);
        assert_eq!(data.labels()[4], 1);
        assert!(data.images()[[4, 1]] < 0.0);
        assert!(data.images()[[9, 2]] < 0.0);
    }

    #[test]
    fn ragged_centers_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let centers = vec![vec![1.0], vec![1.0, 2.0]];
        assert!(gaussian_blobs(&centers, 1, 0.1, &mut rng).is_err());
    }

    #[test]
    fn reads_idx_files() {
        let dir = env::temp_dir().join(format!("backprop-idx-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let mut images = vec![0, 0, 8, 3, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2];
        images.extend_from_slice(&[0, 255, 51, 102]);
        let images_path = dir.join("images");
        fs::write(&images_path, &images).unwrap();

        let labels = vec![0, 0, 8, 1, 0, 0, 0, 2, 4, 9];
        let labels_path = dir.join("labels");
        fs::write(&labels_path, &labels).unwrap();

        let x = read_idx_images(&images_path).unwrap();
        assert_eq!(x, array![[0.0, 1.0], [0.2, 0.4]]);
        assert_eq!(read_idx_labels(&labels_path).unwrap(), vec![4, 9]);
        assert!(read_idx_images(&labels_path).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn oversized_idx_header_is_rejected() {
        let dir = env::temp_dir().join(format!("backprop-idx-huge-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let header = vec![0, 0, 8, 3, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255];
        let path = dir.join("images");
        fs::write(&path, &header).unwrap();

        match read_idx_images(&path) {
            Err(Error::Data(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        fs::remove_dir_all(&dir).unwrap();
    }
}
