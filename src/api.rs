pub mod innertube;
pub mod youtube;
