pub mod screen;
pub mod view_calibration;
