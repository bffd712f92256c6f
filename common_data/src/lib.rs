pub mod avionics;
