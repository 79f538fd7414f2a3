mod test_extrusion_basic;
mod test_frame_basic;
mod test_rail_basic;
