use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the logical extent of an image in pixels.
///
/// # Examples
///
/// ```
/// use tps_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels in the logical extent, ignoring any stride padding.
    pub fn numel(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A single channel f32 image with an explicit row stride.
///
/// The buffer holds `stride * height` samples in row major order where
/// `stride >= width`; samples beyond `width` in each row are alignment
/// padding and carry no meaning. The image is immutable once built.
#[derive(Clone, Debug)]
pub struct Image {
    size: ImageSize,
    stride: usize,
    data: Vec<f32>,
}

impl Image {
    /// Create a new densely packed image (`stride == width`).
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use tps_image::{Image, ImageSize};
    ///
    /// let image = Image::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0f32; 10 * 20],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// ```
    pub fn new(size: ImageSize, data: Vec<f32>) -> Result<Self, ImageError> {
        Self::with_stride(size, size.width, data)
    }

    /// Create a new image with an explicit row stride.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `stride` - The row stride in samples, at least `size.width`.
    /// * `data` - The pixel data, of length `stride * size.height`.
    ///
    /// # Errors
    ///
    /// Returns an error when the stride is smaller than the width or the
    /// buffer length does not match `stride * height`.
    pub fn with_stride(size: ImageSize, stride: usize, data: Vec<f32>) -> Result<Self, ImageError> {
        if stride < size.width {
            return Err(ImageError::InvalidStride(stride, size.width));
        }
        if data.len() != stride * size.height {
            return Err(ImageError::InvalidBufferSize(
                data.len(),
                stride * size.height,
            ));
        }
        Ok(Self { size, stride, data })
    }

    /// Create a new image filled with a constant value.
    pub fn from_size_val(size: ImageSize, val: f32) -> Result<Self, ImageError> {
        Self::new(size, vec![val; size.numel()])
    }

    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// The height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// The row stride in samples.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The raw sample buffer, including stride padding.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The sample at pixel `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(self.data[x + y * self.stride])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;

    #[test]
    fn image_new() -> Result<(), ImageError> {
        let image = Image::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        )?;
        assert_eq!(image.stride(), 3);
        assert_eq!(image.get(2, 1), Some(5.0));
        assert_eq!(image.get(3, 0), None);
        Ok(())
    }

    #[test]
    fn image_with_stride_padding() -> Result<(), ImageError> {
        let image = Image::with_stride(
            ImageSize {
                width: 2,
                height: 2,
            },
            4,
            vec![0.0; 8],
        )?;
        assert_eq!(image.width(), 2);
        assert_eq!(image.stride(), 4);
        assert_eq!(image.as_slice().len(), 8);
        Ok(())
    }

    #[test]
    fn image_invalid_stride() {
        let res = Image::with_stride(
            ImageSize {
                width: 4,
                height: 1,
            },
            2,
            vec![0.0; 2],
        );
        assert_eq!(res.err(), Some(ImageError::InvalidStride(2, 4)));
    }

    #[test]
    fn image_invalid_buffer() {
        let res = Image::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0; 3],
        );
        assert_eq!(res.err(), Some(ImageError::InvalidBufferSize(3, 4)));
    }
}
