fn main() {
    synapseflow_lib::run()
}
