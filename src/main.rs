fn main() {
    if let Err(err) = neuron_topology::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
