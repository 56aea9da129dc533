use eframe::NativeOptions;

pub fn get_native_options() -> NativeOptions {
    let mut options = NativeOptions::default();
    options.viewport = options
        .viewport
        .with_title("Arranger")
        .with_inner_size([1200., 720.])
        .with_min_inner_size([640., 360.]);
    options
}
