mod test_playback;
